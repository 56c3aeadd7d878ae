//! Aggregation of raw GPU samples into summary statistics

use serde::{Deserialize, Serialize};

use crate::provider::GpuSample;

/// Aggregated GPU utilization statistics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuStatsSummary {
    /// Backend that produced the samples
    pub provider: String,
    /// Requested sampling interval in seconds
    pub sample_interval_seconds: f64,
    /// Number of samples captured
    pub sample_count: usize,
    /// Arithmetic mean of the load readings
    pub avg_gpu_load_percent: f64,
    /// Highest load reading observed
    pub max_gpu_load_percent: f64,
    /// Arithmetic mean of the VRAM readings
    pub avg_vram_mb: f64,
    /// Highest VRAM reading observed
    pub max_vram_mb: f64,
}

/// Reduce a sample sequence to summary statistics.
///
/// Returns `None` for an empty sequence: a run with no usable samples has
/// no statistics at all, as opposed to statistics that happen to be zero.
/// Means are computed as a full-precision `f64` sum divided by the count;
/// no rounding is applied here. Readings are carried through as raw data,
/// including values outside the nominal 0..=100 load range.
pub fn aggregate(
    samples: &[GpuSample],
    provider: &str,
    interval_seconds: f64,
) -> Option<GpuStatsSummary> {
    if samples.is_empty() {
        return None;
    }

    let count = samples.len();
    let mut load_sum = 0.0f64;
    let mut vram_sum = 0.0f64;
    let mut load_max = f64::NEG_INFINITY;
    let mut vram_max = f64::NEG_INFINITY;

    for sample in samples {
        load_sum += sample.load_percent;
        vram_sum += sample.vram_used_mb;
        load_max = load_max.max(sample.load_percent);
        vram_max = vram_max.max(sample.vram_used_mb);
    }

    Some(GpuStatsSummary {
        provider: provider.to_string(),
        sample_interval_seconds: interval_seconds,
        sample_count: count,
        avg_gpu_load_percent: load_sum / count as f64,
        max_gpu_load_percent: load_max,
        avg_vram_mb: vram_sum / count as f64,
        max_vram_mb: vram_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sample(load: f64, vram: f64) -> GpuSample {
        GpuSample {
            taken_at: Instant::now(),
            load_percent: load,
            vram_used_mb: vram,
        }
    }

    #[test]
    fn test_empty_input_yields_absent() {
        assert!(aggregate(&[], "nvml", 0.5).is_none());
    }

    #[test]
    fn test_count_matches_sequence_length() {
        let samples: Vec<_> = (0..17).map(|i| sample(i as f64, 1.0)).collect();
        let stats = aggregate(&samples, "nvml", 0.5).unwrap();
        assert_eq!(stats.sample_count, 17);
    }

    #[test]
    fn test_mean_is_exact() {
        let samples = [sample(10.0, 100.0), sample(20.0, 300.0), sample(60.0, 200.0)];
        let stats = aggregate(&samples, "nvml", 0.25).unwrap();
        assert_eq!(stats.avg_gpu_load_percent, 30.0);
        assert_eq!(stats.avg_vram_mb, 200.0);
        assert_eq!(stats.max_gpu_load_percent, 60.0);
        assert_eq!(stats.max_vram_mb, 300.0);
        assert_eq!(stats.provider, "nvml");
        assert_eq!(stats.sample_interval_seconds, 0.25);
    }

    #[test]
    fn test_single_sample() {
        let stats = aggregate(&[sample(42.5, 512.0)], "amdgpu-sysfs", 1.0).unwrap();
        assert_eq!(stats.sample_count, 1);
        assert_eq!(stats.avg_gpu_load_percent, 42.5);
        assert_eq!(stats.max_gpu_load_percent, 42.5);
    }

    #[test]
    fn test_out_of_range_readings_kept_raw() {
        // some backends report >100% under load spikes; carry it through
        let samples = [sample(105.0, 0.0), sample(-1.0, 0.0)];
        let stats = aggregate(&samples, "mock", 0.5).unwrap();
        assert_eq!(stats.max_gpu_load_percent, 105.0);
        assert_eq!(stats.avg_gpu_load_percent, 52.0);
    }

    #[test]
    fn test_order_independent_for_avg_and_max() {
        let a = [sample(1.0, 9.0), sample(5.0, 3.0), sample(3.0, 6.0)];
        let b = [sample(3.0, 6.0), sample(1.0, 9.0), sample(5.0, 3.0)];
        let sa = aggregate(&a, "mock", 0.5).unwrap();
        let sb = aggregate(&b, "mock", 0.5).unwrap();
        assert_eq!(sa.avg_gpu_load_percent, sb.avg_gpu_load_percent);
        assert_eq!(sa.max_vram_mb, sb.max_vram_mb);
    }
}
