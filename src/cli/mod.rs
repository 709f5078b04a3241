//! CLI module for dossier
//!
//! Provides command-line interface parsing for the `dossier` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::utils::config::{ConfigError, ResearchConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// dossier - research document acquisition
///
/// Searches the web, downloads and normalizes documents into a session
/// knowledge base, and reports whether enough material exists to write a
/// research report.
#[derive(Parser, Debug)]
#[command(
    name = "dossier",
    version,
    about = "Web research document acquisition",
    after_help = "EXAMPLES:\n    \
                  dossier search \"tiptap holdings\"          # List search hits\n    \
                  dossier fetch https://a.example/report.pdf  # Acquire documents\n    \
                  dossier config --validate                   # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file (falls back to defaults and DOSSIER_* variables)
    #[arg(short, long, default_value = "dossier.toml", global = true)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the web and print the hits
    Search {
        /// Query text
        query: String,

        /// Override the configured maximum number of hits
        #[arg(short = 'n', long)]
        max_hits: Option<usize>,
    },

    /// Acquire one or more URLs into a fresh knowledge base
    Fetch {
        /// URLs to download, in order
        #[arg(required = true)]
        urls: Vec<String>,

        /// Research goal, used for the readiness warning
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Only validate, print nothing on success
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Load `path` if it exists, else defaults; `DOSSIER_*` variables win either way.
pub fn load_config(path: &Path) -> Result<ResearchConfig, ConfigError> {
    if !path.exists() {
        return ResearchConfig::from_env();
    }

    let mut config = ResearchConfig::load(path)?;
    config.apply_overrides(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}
