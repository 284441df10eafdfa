//! Service configuration, read from the environment once at startup.
//!
//! Every setting has a default; unset or unparsable values fall back to it.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ANALYSIS_TIMEOUT_SECS, DEFAULT_FFPROBE_PATH, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_PORT,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::detector::AnalysisSettings;
use crate::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `MAX_CONTENT_LENGTH`: size gate ceiling in bytes
    pub max_content_length: u64,
    pub ffprobe_path: PathBuf,
    /// `ANALYSIS_TIMEOUT_SECS`; `0` disables the ceiling
    pub analysis_timeout: Option<Duration>,
    /// `MAX_SCANNED_FRAMES`; unset means no ceiling
    pub max_scanned_frames: Option<u64>,
    pub upstream_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            ffprobe_path: PathBuf::from(DEFAULT_FFPROBE_PATH),
            analysis_timeout: Some(Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS)),
            max_scanned_frames: None,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let analysis_timeout = match parsed::<u64>(&lookup, "ANALYSIS_TIMEOUT_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.analysis_timeout,
        };

        Self {
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            max_content_length: parsed(&lookup, "MAX_CONTENT_LENGTH")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_content_length),
            ffprobe_path: lookup("FFPROBE_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.ffprobe_path),
            analysis_timeout,
            max_scanned_frames: parsed(&lookup, "MAX_SCANNED_FRAMES").filter(|v| *v > 0),
            upstream_timeout: parsed(&lookup, "UPSTREAM_TIMEOUT_SECS")
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            log_format: parsed(&lookup, "LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    pub fn analysis(&self) -> AnalysisSettings {
        AnalysisSettings {
            ffprobe_path: self.ffprobe_path.clone(),
            timeout: self.analysis_timeout,
            max_frames: self.max_scanned_frames,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
