//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// MindConnect: mental-wellness companion
///
/// Takes mood assessments, suggests a peer group with calming media, and
/// talks through stressors with a therapist bot backed by a generative-text
/// endpoint.
#[derive(Debug, Parser)]
#[command(name = "mindconnect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Generative-text endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// API key appended to requests as the `key` query parameter
    #[arg(long = "api-key", global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Maximum number of attempts per request, counting the first
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Delay before the first retry in milliseconds (doubles per retry)
    #[arg(long = "retry-delay-ms", global = true)]
    pub retry_delay_ms: Option<u64>,

    /// Display name used in greetings
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Age group: teen, adult, or elder
    #[arg(long = "age-group", global = true)]
    pub age_group: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for mindconnect
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Suggest a peer group, movies and songs for a score
    Recommend {
        /// Assessment score
        #[arg(long)]
        score: u32,

        /// Maximum possible score
        #[arg(long = "max-score", default_value_t = 25)]
        max_score: u32,
    },

    /// Take an assessment from answers (1-5 each) and get recommendations
    Assess {
        /// Answer to each question, in order
        #[arg(required = true, num_args = 1..)]
        answers: Vec<u8>,

        /// Record a daily check-in instead of a full assessment
        #[arg(long)]
        daily: bool,
    },

    /// Talk to the therapist bot (interactive unless a message is given)
    Chat {
        /// Single message to send
        message: Option<String>,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
