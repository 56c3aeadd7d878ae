//! Environment-driven configuration
//!
//! One setting today: the timezone used when stamping benchmark records.

use chrono::{Local, SecondsFormat, Utc};

/// Environment variable selecting the record timezone
pub const TIMEZONE_ENV: &str = "GBENCH_TZ";

/// Compact stamp embedded in artifact filenames
const FILE_STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Timezone applied to record timestamps and artifact filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timezone {
    /// Coordinated Universal Time (the default)
    #[default]
    Utc,
    /// The host's local timezone
    Local,
}

impl Timezone {
    /// Read the timezone from [`TIMEZONE_ENV`], defaulting to UTC.
    pub fn from_env() -> Self {
        match std::env::var(TIMEZONE_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Timezone::Utc,
        }
    }

    /// Parse a timezone setting. Unrecognized values are logged and fall
    /// back to UTC rather than failing the run.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "utc" => Timezone::Utc,
            "local" => Timezone::Local,
            other => {
                log::warn!("unrecognized {} value '{}'; using UTC", TIMEZONE_ENV, other);
                Timezone::Utc
            }
        }
    }

    /// Current time as an RFC 3339 timestamp with numeric offset.
    pub fn now_rfc3339(&self) -> String {
        match self {
            Timezone::Utc => Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            Timezone::Local => Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }

    /// Current time as the compact filename stamp.
    pub fn file_stamp(&self) -> String {
        match self {
            Timezone::Utc => Utc::now().format(FILE_STAMP_FORMAT).to_string(),
            Timezone::Local => Local::now().format(FILE_STAMP_FORMAT).to_string(),
        }
    }
}
