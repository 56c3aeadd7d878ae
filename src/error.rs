//! Error types for gpu-bench

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Main error type for gpu-bench
#[derive(Error, Debug)]
pub enum BenchError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// NVML error (NVIDIA GPUs)
    #[cfg(feature = "nvidia")]
    #[error("NVML error: {0}")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),

    /// GPU query capability absent or uninitializable
    #[error("GPU provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// One sampling attempt failed
    #[error("Sample read failed: {0}")]
    SampleRead(String),

    /// Non-positive or non-finite sampling interval
    #[error("Invalid sampling interval: {0} (must be a positive number of seconds)")]
    InvalidInterval(f64),

    /// Sampler started more than once
    #[error("Sampler already started")]
    AlreadyStarted,

    /// Benchmarked command could not be launched
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        /// Program token of the command that failed to start
        command: String,
        #[source]
        source: io::Error,
    },

    /// Benchmark artifact could not be persisted
    #[error("Failed to write benchmark record to {}: {source}", .path.display())]
    Write {
        /// Artifact or directory path that could not be written
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Run interrupted by the user before the child terminated
    #[error("Benchmark run interrupted")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_provider_unavailable() {
        let err = BenchError::ProviderUnavailable("no GPU backend detected".to_string());
        assert_eq!(
            err.to_string(),
            "GPU provider unavailable: no GPU backend detected"
        );
    }

    #[test]
    fn test_display_invalid_interval() {
        let err = BenchError::InvalidInterval(-0.5);
        assert!(err.to_string().contains("-0.5"));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_display_launch() {
        let err = BenchError::Launch {
            command: "frobnicate".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("frobnicate"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_display_write() {
        let err = BenchError::Write {
            path: PathBuf::from("/tmp/out/bench.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("bench.json"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let err: BenchError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json }").unwrap_err();
        let err: BenchError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }
}
