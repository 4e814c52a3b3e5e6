//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::fetch::RetryPolicy;
use crate::genai::AgeGroup;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Clone)]
pub struct ValidatedConfig {
    /// Generative-text endpoint
    pub endpoint: Url,

    /// API key, if configured (never empty)
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retry policy for generative-text requests
    pub retry_policy: RetryPolicy,

    /// Display name used in greetings
    pub username: Option<String>,

    /// Age group of the local profile
    pub age_group: Option<AgeGroup>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let age_group = self.age_group.map_or("none", AgeGroup::id);

        write!(
            f,
            "Config {{ endpoint: {}, api_key: {}, timeout: {}s, retry: {}x/{}ms, age_group: {} }}",
            self.endpoint,
            if self.api_key.is_some() { "set" } else { "unset" },
            self.timeout.as_secs(),
            self.retry_policy.max_attempts,
            self.retry_policy.initial_delay.as_millis(),
            age_group,
        )
    }
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .field("username", &self.username)
            .field("age_group", &self.age_group)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint is not an absolute http(s) URL
    /// - The timeout is zero
    /// - `max_attempts` is zero or the initial delay is zero
    /// - The age group is not a known id
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let endpoint = Self::resolve_endpoint(cli, toml)?;
        let api_key = Self::resolve_api_key(cli, toml);
        let timeout = Self::resolve_timeout(cli, toml)?;
        let retry_policy = Self::build_retry_policy(cli, toml)?;
        let username = Self::resolve_username(cli, toml);
        let age_group = Self::resolve_age_group(cli, toml)?;

        Ok(Self {
            endpoint,
            api_key,
            timeout,
            retry_policy,
            username,
            age_group,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Returns the profile's age group, which assessments and
    /// recommendations cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when no age group is set.
    pub fn require_age_group(&self) -> Result<AgeGroup, ConfigError> {
        self.age_group.ok_or_else(|| {
            ConfigError::missing(
                field::AGE_GROUP,
                "Use --age-group or set profile.age_group in config file",
            )
        })
    }

    fn resolve_endpoint(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let url_str = cli
            .endpoint
            .as_deref()
            .or_else(|| toml.and_then(|t| t.api.endpoint.as_deref()))
            .unwrap_or(defaults::ENDPOINT);

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
            });
        }

        Ok(url)
    }

    fn resolve_api_key(cli: &Cli, toml: Option<&TomlConfig>) -> Option<String> {
        cli.api_key
            .as_deref()
            .or_else(|| toml.and_then(|t| t.api.api_key.as_deref()))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.api.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: field::TIMEOUT,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let initial_delay_ms = cli
            .retry_delay_ms
            .or_else(|| retry.and_then(|r| r.initial_delay_ms))
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_MS);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if initial_delay_ms == 0 {
            return Err(ConfigError::InvalidRetry(
                "initial_delay_ms must be greater than 0".to_string(),
            ));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(Duration::from_millis(initial_delay_ms)))
    }

    fn resolve_username(cli: &Cli, toml: Option<&TomlConfig>) -> Option<String> {
        cli.username
            .as_deref()
            .or_else(|| toml.and_then(|t| t.profile.username.as_deref()))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    fn resolve_age_group(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<AgeGroup>, ConfigError> {
        cli.age_group
            .as_deref()
            .or_else(|| toml.and_then(|t| t.profile.age_group.as_deref()))
            .map(str::parse::<AgeGroup>)
            .transpose()
            .map_err(ConfigError::from)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
