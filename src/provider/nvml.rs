//! NVIDIA GPU readings via NVML

use std::time::Instant;

use nvml_wrapper::Nvml;

use crate::error::{BenchError, Result};
use crate::provider::{GpuProvider, GpuSample};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// NVML-backed provider for NVIDIA GPUs
///
/// Queries device 0. Driver-library load failure is captured at
/// construction and surfaces only through `is_available`.
pub struct NvmlProvider {
    nvml: Option<Nvml>,
    device_index: u32,
}

impl NvmlProvider {
    /// Initialize NVML, capturing any failure internally.
    pub fn new() -> Self {
        let nvml = match Nvml::init() {
            Ok(nvml) => Some(nvml),
            Err(e) => {
                log::warn!("NVML initialization failed: {}", e);
                None
            }
        };
        Self {
            nvml,
            device_index: 0,
        }
    }
}

impl Default for NvmlProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuProvider for NvmlProvider {
    fn name(&self) -> &'static str {
        "nvml"
    }

    fn is_available(&self) -> bool {
        self.nvml
            .as_ref()
            .map(|nvml| nvml.device_by_index(self.device_index).is_ok())
            .unwrap_or(false)
    }

    fn sample(&self) -> Result<GpuSample> {
        let nvml = self
            .nvml
            .as_ref()
            .ok_or_else(|| BenchError::ProviderUnavailable("NVML not initialized".to_string()))?;

        let device = nvml.device_by_index(self.device_index)?;
        let load_percent = device.utilization_rates()?.gpu as f64;
        let vram_used_mb = device.memory_info()?.used as f64 / BYTES_PER_MB;

        Ok(GpuSample {
            taken_at: Instant::now(),
            load_percent,
            vram_used_mb,
        })
    }
}
