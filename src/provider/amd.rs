// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! AMD GPU readings via the amdgpu sysfs interface
//!
//! Reads the `gpu_busy_percent` and `mem_info_vram_used` counters the
//! amdgpu kernel driver exposes under `/sys/class/drm/card*/device`. No
//! userspace driver library is required.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{BenchError, Result};
use crate::provider::{GpuProvider, GpuSample};

const DRM_ROOT: &str = "/sys/class/drm";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Provider backed by the amdgpu driver's sysfs counters
pub struct AmdSysfsProvider {
    device_path: PathBuf,
}

impl AmdSysfsProvider {
    /// Find the first DRM card exposing the amdgpu utilization counter.
    ///
    /// Returns `None` when no card does, which covers both "no AMD GPU"
    /// and "driver too old to expose gpu_busy_percent".
    pub fn detect() -> Option<Self> {
        Self::detect_in(Path::new(DRM_ROOT))
    }

    fn detect_in(root: &Path) -> Option<Self> {
        let entries = fs::read_dir(root).ok()?;
        let mut cards: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                // cardN only; cardN-DP-1 style entries are connectors
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with("card") && !name.contains('-'))
                    .unwrap_or(false)
            })
            .collect();
        cards.sort();

        for card in cards {
            let device_path = card.join("device");
            if device_path.join("gpu_busy_percent").exists() {
                return Some(Self { device_path });
            }
        }
        None
    }

    fn read_metric(&self, file: &str) -> Result<f64> {
        let path = self.device_path.join(file);
        let raw = fs::read_to_string(&path)
            .map_err(|e| BenchError::SampleRead(format!("{}: {}", path.display(), e)))?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| BenchError::SampleRead(format!("{}: {}", path.display(), e)))
    }
}

impl GpuProvider for AmdSysfsProvider {
    fn name(&self) -> &'static str {
        "amdgpu-sysfs"
    }

    fn is_available(&self) -> bool {
        self.device_path.join("gpu_busy_percent").exists()
    }

    fn sample(&self) -> Result<GpuSample> {
        if !self.is_available() {
            return Err(BenchError::ProviderUnavailable(format!(
                "{} no longer readable",
                self.device_path.display()
            )));
        }

        let load_percent = self.read_metric("gpu_busy_percent")?;
        let vram_used_mb = self.read_metric("mem_info_vram_used")? / BYTES_PER_MB;

        Ok(GpuSample {
            taken_at: Instant::now(),
            load_percent,
            vram_used_mb,
        })
    }
}
