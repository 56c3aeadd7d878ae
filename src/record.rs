//! Benchmark record assembly and persistence
//!
//! A [`BenchmarkRecord`] is created once per run, after the child process
//! has terminated, and written exactly once as a pretty-printed JSON
//! artifact whose filename embeds the label and a timestamp.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Timezone;
use crate::error::{BenchError, Result};
use crate::stats::GpuStatsSummary;

/// One persisted benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// User-supplied label for the run
    pub label: String,
    /// Command and arguments that were executed
    pub cmd: Vec<String>,
    /// Wall-clock duration of the run in seconds
    pub total_time_seconds: f64,
    /// Optional externally measured runtime; serialized as `null` when absent
    pub runtime_seconds: Option<f64>,
    /// GPU statistics; the field is omitted entirely when no samples were
    /// captured (absent, not zeroed)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gpu_stats: Option<GpuStatsSummary>,
    /// Opaque passthrough metadata
    #[serde(default)]
    pub extra: Map<String, Value>,
    /// Timezone-aware creation timestamp (RFC 3339)
    pub recorded_at: String,
}

impl BenchmarkRecord {
    /// Assemble a record stamped with the configured timezone.
    pub fn new(
        label: &str,
        cmd: &[String],
        total_time_seconds: f64,
        runtime_seconds: Option<f64>,
        gpu_stats: Option<GpuStatsSummary>,
        extra: Map<String, Value>,
        timezone: Timezone,
    ) -> Self {
        Self {
            label: label.to_string(),
            cmd: cmd.to_vec(),
            total_time_seconds,
            runtime_seconds,
            gpu_stats,
            extra,
            recorded_at: timezone.now_rfc3339(),
        }
    }
}

/// Persists benchmark records as timestamped JSON artifacts.
pub struct BenchmarkWriter {
    output_dir: PathBuf,
    timezone: Timezone,
}

impl BenchmarkWriter {
    /// Create a writer targeting `output_dir`. The directory is created
    /// lazily on the first write.
    pub fn new<P: AsRef<Path>>(output_dir: P, timezone: Timezone) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            timezone,
        }
    }

    /// Write `record` to a uniquely named artifact, returning its path.
    ///
    /// The filename embeds a slug of the label and a second-resolution
    /// timestamp; when two runs with the same label land in the same
    /// second, a numeric suffix keeps them from colliding. Directory
    /// creation or write failure surfaces as [`BenchError::Write`].
    pub fn write(&self, record: &BenchmarkRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| BenchError::Write {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let slug = artifact_slug(&record.label, &record.cmd);
        let stamp = self.timezone.file_stamp();
        let path = self.unique_path(&slug, &stamp);

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).map_err(|e| BenchError::Write {
            path: path.clone(),
            source: e,
        })?;

        log::info!("Benchmark written: {}", path.display());
        Ok(path)
    }

    fn unique_path(&self, slug: &str, stamp: &str) -> PathBuf {
        let candidate = self.output_dir.join(format!("{}_{}.json", slug, stamp));
        if !candidate.exists() {
            return candidate;
        }
        let mut n = 1usize;
        loop {
            let candidate = self
                .output_dir
                .join(format!("{}_{}_{}.json", slug, stamp, n));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Reduce a label to a filesystem-safe slug.
///
/// Runs of characters outside `[A-Za-z0-9._-]` collapse to a single `-`,
/// and leading/trailing `-`, `.`, `_` are trimmed. An empty label falls
/// back to the first command token; a slug that still comes out empty
/// falls back to `"benchmark"`.
pub fn artifact_slug(label: &str, cmd: &[String]) -> String {
    let base = if label.is_empty() {
        cmd.first().map(String::as_str).unwrap_or("")
    } else {
        label
    };
    let slug = slugify(base);
    if slug.is_empty() {
        "benchmark".to_string()
    } else {
        slug
    }
}

fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_dash = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    out.trim_matches(|c| matches!(c, '-' | '.' | '_')).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with(gpu_stats: Option<GpuStatsSummary>) -> BenchmarkRecord {
        BenchmarkRecord::new(
            "unit test",
            &["true".to_string()],
            1.5,
            None,
            gpu_stats,
            Map::new(),
            Timezone::Utc,
        )
    }

    fn stats() -> GpuStatsSummary {
        GpuStatsSummary {
            provider: "mock".to_string(),
            sample_interval_seconds: 0.25,
            sample_count: 4,
            avg_gpu_load_percent: 50.0,
            max_gpu_load_percent: 75.0,
            avg_vram_mb: 100.0,
            max_vram_mb: 120.0,
        }
    }

    #[test]
    fn test_slug_normalization() {
        assert_eq!(artifact_slug("my bench/run!", &[]), "my-bench-run");
        assert_eq!(artifact_slug("train v1.2_final", &[]), "train-v1.2_final");
        assert_eq!(artifact_slug("--weird--", &[]), "weird");
    }

    #[test]
    fn test_slug_falls_back_to_command_token() {
        let cmd = vec!["/usr/bin/stress".to_string()];
        assert_eq!(artifact_slug("", &cmd), "usr-bin-stress");
    }

    #[test]
    fn test_slug_last_resort() {
        assert_eq!(artifact_slug("", &[]), "benchmark");
        assert_eq!(artifact_slug("///", &[]), "benchmark");
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let writer = BenchmarkWriter::new(dir.path(), Timezone::Utc);

        let mut extra = Map::new();
        extra.insert("exit_code".to_string(), json!(0));
        let record = BenchmarkRecord::new(
            "roundtrip",
            &["sleep".to_string(), "1".to_string()],
            1.01,
            None,
            Some(stats()),
            extra,
            Timezone::Utc,
        );

        let path = writer.write(&record).unwrap();
        assert!(path.exists());

        let text = fs::read_to_string(&path).unwrap();
        let parsed: BenchmarkRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.label, "roundtrip");
        assert_eq!(parsed.cmd, vec!["sleep", "1"]);
        assert_eq!(parsed.total_time_seconds, 1.01);
        assert_eq!(parsed.extra["exit_code"], json!(0));
        let gpu = parsed.gpu_stats.unwrap();
        assert_eq!(gpu.sample_count, 4);
        assert_eq!(gpu.provider, "mock");
    }

    #[test]
    fn test_absent_gpu_stats_is_omitted_not_zeroed() {
        let dir = tempfile::tempdir().unwrap();
        let writer = BenchmarkWriter::new(dir.path(), Timezone::Utc);

        let path = writer.write(&record_with(None)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("gpu_stats"));

        // runtime_seconds stays present as an explicit null
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("gpu_stats").is_none());
        assert_eq!(value.get("runtime_seconds"), Some(&Value::Null));
    }

    #[test]
    fn test_present_gpu_stats_has_exact_fields() {
        let dir = tempfile::tempdir().unwrap();
        let writer = BenchmarkWriter::new(dir.path(), Timezone::Utc);

        let path = writer.write(&record_with(Some(stats()))).unwrap();
        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let gpu = value.get("gpu_stats").unwrap().as_object().unwrap();
        for field in [
            "provider",
            "sample_interval_seconds",
            "sample_count",
            "avg_gpu_load_percent",
            "max_gpu_load_percent",
            "avg_vram_mb",
            "max_vram_mb",
        ] {
            assert!(gpu.contains_key(field), "missing {}", field);
        }
        assert_eq!(gpu.len(), 7);
    }

    #[test]
    fn test_consecutive_writes_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let writer = BenchmarkWriter::new(dir.path(), Timezone::Utc);

        let first = writer.write(&record_with(None)).unwrap();
        let second = writer.write(&record_with(None)).unwrap();
        let third = writer.write(&record_with(None)).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert!(first.exists() && second.exists() && third.exists());
    }

    #[test]
    fn test_unwritable_output_dir_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the output directory should be
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let writer = BenchmarkWriter::new(&blocker, Timezone::Utc);
        match writer.write(&record_with(None)) {
            Err(BenchError::Write { path, .. }) => assert_eq!(path, blocker),
            other => panic!("expected Write, got {:?}", other),
        }
    }

    #[test]
    fn test_recorded_at_is_rfc3339_with_offset() {
        let record = record_with(None);
        assert!(record.recorded_at.ends_with("+00:00"));
        assert!(record.recorded_at.contains('T'));
    }
}
