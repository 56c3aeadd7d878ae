//! gpu-bench: benchmark any command while sampling GPU utilization
//!
//! Runs an external command as a supervised child process, samples GPU
//! load and VRAM usage on a background schedule for the duration of the
//! run, and persists an aggregated benchmark record as a timestamped
//! JSON artifact.
//!
//! Exactly two concurrent units of work exist per run: the child process
//! and one sampler thread. The sampler owns its GPU provider exclusively;
//! a host without a usable GPU backend degrades to a record with no
//! `gpu_stats` field rather than failing the benchmark.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//!
//! use gbenchlib::config::Timezone;
//! use gbenchlib::record::{BenchmarkRecord, BenchmarkWriter};
//! use gbenchlib::{aggregate, provider, supervisor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cmd = vec!["sleep".to_string(), "1".to_string()];
//! let cancel = AtomicBool::new(false);
//!
//! let outcome = supervisor::run(&cmd, 0.5, provider::detect(), &cancel)?;
//! let gpu_stats = aggregate(&outcome.samples, outcome.provider, 0.5);
//!
//! let timezone = Timezone::from_env();
//! let record = BenchmarkRecord::new(
//!     "idle",
//!     &cmd,
//!     outcome.elapsed_seconds,
//!     None,
//!     gpu_stats,
//!     Default::default(),
//!     timezone,
//! );
//! let path = BenchmarkWriter::new("benchmarks", timezone).write(&record)?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod record;
pub mod sampler;
pub mod stats;
pub mod status;
pub mod supervisor;

pub use config::Timezone;
pub use error::{BenchError, Result};
pub use provider::{GpuProvider, GpuSample};
pub use record::{BenchmarkRecord, BenchmarkWriter};
pub use sampler::GpuSampler;
pub use stats::{aggregate, GpuStatsSummary};
pub use supervisor::RunOutcome;
