//! Application constants

/// Largest declared `Content-Length` accepted for analysis (10 MiB)
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 10 * 1024 * 1024;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Analyzer executable, resolved through `PATH` unless overridden
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";

/// Wall-clock ceiling for one analysis run (2 minutes)
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 120;

/// Timeout for the metadata request to the origin
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
