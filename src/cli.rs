//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::repo::parse_repo_reference;
use clap::Parser;
use std::path::PathBuf;

/// ecostats - monthly active contributors for a software ecosystem
///
/// Reads an ecosystem manifest (explicit repositories plus GitHub
/// organizations), fetches weekly contributor statistics for every
/// repository and prints the number of distinct contributors per month.
///
/// Examples:
///   ecostats --token $GITHUB_TOKEN --file stacks.json
///   ecostats --file near.json --weekly --format json
///   ecostats --repo https://github.com/owner/repo
///   ecostats --init-config
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// GitHub API token
    ///
    /// Unauthenticated requests are limited to 60 per hour.
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Ecosystem manifest (JSON) to process [default: stacks.json]
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ecostats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", env = "ECOSTATS_API_URL")]
    pub api_url: Option<String>,

    /// Give up on a repository after this many attempts
    ///
    /// By default rate-limited and pending requests are retried until
    /// GitHub answers.
    #[arg(long, value_name = "COUNT")]
    pub max_attempts: Option<u32>,

    /// Inspect a single repository instead of a manifest
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,

    /// Also report distinct contributors per week
    #[arg(long)]
    pub weekly: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .ecostats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per month (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_attempts == Some(0) {
            return Err("Max attempts must be at least 1".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref repo) = self.repo {
            if parse_repo_reference(repo).is_none() {
                return Err(format!("Not a repository reference: {}", repo));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
