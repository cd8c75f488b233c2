//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// TripWeaver - multi-source itinerary data orchestration
#[derive(Parser)]
#[command(
    name = "tw",
    about = "Collect, cross-validate and integrate itinerary data for a travel framework",
    version,
    after_help = "Logs are written to: ~/.local/share/tripweaver/logs/tripweaver.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the full planning pipeline for a request file
    Plan {
        /// Planning request YAML (framework + needs)
        #[arg(value_name = "REQUEST")]
        request: PathBuf,

        /// Output format (overrides config)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Parse and validate a request without collecting
    Validate {
        /// Planning request YAML (framework + needs)
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },

    /// Print the active knowledge base as YAML
    Knowledge,
}

/// Output format for plan results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Path of the log file the binary writes to
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripweaver")
        .join("logs")
        .join("tripweaver.log")
}
