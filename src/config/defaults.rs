//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default generative-text endpoint (Gemini `generateContent`).
pub const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent";

/// Default per-request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default maximum number of attempts, counting the first.
pub const RETRY_MAX_ATTEMPTS: u32 = 5;

/// Default delay before the first retry in milliseconds.
pub const RETRY_INITIAL_DELAY_MS: u64 = 1000;

/// Default configuration file name written by `init`.
pub const CONFIG_FILE: &str = "mindconnect.toml";

/// Default per-request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default initial retry delay as Duration.
#[must_use]
pub const fn retry_initial_delay() -> Duration {
    Duration::from_millis(RETRY_INITIAL_DELAY_MS)
}
