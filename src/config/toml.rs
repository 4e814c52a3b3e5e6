//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Generative-text API section
    #[serde(default)]
    pub api: ApiSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,

    /// Local user profile
    #[serde(default)]
    pub profile: ProfileSection,
}

/// Generative-text API section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// Endpoint URL
    pub endpoint: Option<String>,

    /// API key
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    pub timeout: Option<u64>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts, counting the first
    pub max_attempts: Option<u32>,

    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: Option<u64>,
}

/// Local user profile section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSection {
    /// Display name
    pub username: Option<String>,

    /// Age group id: "teen", "adult" or "elder"
    pub age_group: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# MindConnect Configuration File

[api]
# Generative-text endpoint (default: Gemini generateContent)
# endpoint = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent"

# API key, sent as the `key` query parameter
# api_key = "your-api-key"

# Per-request timeout in seconds (default: 30)
# timeout = 30

[retry]
# Maximum number of attempts, counting the first (default: 5)
# Retries happen on 429, 5xx and network errors; 401 is never retried.
# max_attempts = 5

# Delay before the first retry in milliseconds, doubled after each retry (default: 1000)
# initial_delay_ms = 1000

[profile]
# Display name used in greetings
# username = "Ravi"

# Age group: "teen" (13-17), "adult" (18-64) or "elder" (65+)
age_group = "adult"
"#
    .to_string()
}
