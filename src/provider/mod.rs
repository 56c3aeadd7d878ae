//! GPU provider adapters
//!
//! Abstracts the hardware query capability behind a small trait so the
//! sampler can be driven by NVML, the amdgpu sysfs interface, or a test
//! double. A backend that fails to initialize captures the failure and
//! reports itself unavailable; detection never aborts the caller.

use std::time::Instant;

use crate::error::{BenchError, Result};

#[cfg(target_os = "linux")]
pub mod amd;
#[cfg(feature = "nvidia")]
pub mod nvml;

/// One instantaneous GPU reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuSample {
    /// Monotonic capture time
    pub taken_at: Instant,
    /// GPU load percentage as reported by the backend
    pub load_percent: f64,
    /// VRAM in use, in megabytes
    pub vram_used_mb: f64,
}

/// Hardware query capability driving the sampler
pub trait GpuProvider: Send {
    /// Fixed backend identifier, embedded unchanged in the final record
    fn name(&self) -> &'static str;

    /// Whether the backend initialized successfully. Must never panic.
    fn is_available(&self) -> bool;

    /// Take one instantaneous reading.
    ///
    /// Fails with [`BenchError::ProviderUnavailable`] when called on an
    /// unavailable backend, and [`BenchError::SampleRead`] when a single
    /// query attempt fails.
    fn sample(&self) -> Result<GpuSample>;
}

/// Fallback provider used when no GPU backend is usable
pub struct NoneProvider;

impl GpuProvider for NoneProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn sample(&self) -> Result<GpuSample> {
        Err(BenchError::ProviderUnavailable(
            "no GPU backend detected".to_string(),
        ))
    }
}

/// Detect the first usable GPU backend.
///
/// Preference order: NVML (when built with the `nvidia` feature), then the
/// amdgpu sysfs interface on Linux. Falls back to [`NoneProvider`] so the
/// caller never has to handle a detection failure; an unavailable provider
/// simply yields zero samples downstream.
pub fn detect() -> Box<dyn GpuProvider + Send> {
    #[cfg(feature = "nvidia")]
    {
        let provider = nvml::NvmlProvider::new();
        if provider.is_available() {
            log::debug!("using NVML GPU provider");
            return Box::new(provider);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(provider) = amd::AmdSysfsProvider::detect() {
            log::debug!("using amdgpu sysfs GPU provider");
            return Box::new(provider);
        }
    }

    log::debug!("no GPU backend detected");
    Box::new(NoneProvider)
}
