//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on values that don't parse.
//! In local dev, call `dotenvy::dotenv().ok()` first so a `.env` file is honoured.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_OUTPUT_FILE: &str = "InputStimulus.txt";
pub const DEFAULT_MAX_PER_SECOND: u32 = 10;
pub const DEFAULT_SHUTDOWN_AFTER_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// CSV file with `type,payload` records.
    pub input_csv: Option<PathBuf>,
    /// File that file-lane items are appended to.
    pub output_file: PathBuf,
    /// Submissions allowed per second. 0 disables pacing.
    pub max_per_second: u32,
    /// Seconds before the run is stopped. 0 disables the timer.
    pub shutdown_after_secs: u64,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            input_csv: lookup("PCQ_INPUT_CSV").map(PathBuf::from),
            output_file: lookup("PCQ_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            max_per_second: parsed_var(&lookup, "PCQ_MAX_PER_SECOND", DEFAULT_MAX_PER_SECOND)?,
            shutdown_after_secs: parsed_var(
                &lookup,
                "PCQ_SHUTDOWN_AFTER_SECS",
                DEFAULT_SHUTDOWN_AFTER_SECS,
            )?,
            otel_endpoint: lookup("OTEL_ENDPOINT"),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parsed_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{name}={raw:?} is invalid: {e}"))),
    }
}
