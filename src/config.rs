//! Configuration
//!
//! Command-line arguments with environment fallbacks. A `.env` file in the
//! working directory is read first when present.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::export::ExportFormat;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// `EcoPackAI` report tool configuration
#[derive(Debug, Parser)]
#[command(name = "ecopack-report", about = "EcoPackAI sustainability reports", long_about = None)]
pub struct Config {
    /// Session file holding the latest prediction payload
    #[arg(long, env = "ECOPACK_STORE", default_value = ".ecopack/session.json", global = true)]
    pub store: PathBuf,

    /// Directory exported reports are written to
    #[arg(long, env = "ECOPACK_EXPORT_DIR", default_value = "exports", global = true)]
    pub export_dir: PathBuf,

    /// `typst` executable used to render PDF reports
    #[arg(long, env = "TYPST_BIN", default_value = "typst", global = true)]
    pub typst_bin: PathBuf,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a prediction payload as the current session
    Store {
        /// Payload file, or `-` for standard input
        input: PathBuf,
    },

    /// Show summary cards and the recommendations table
    Show,

    /// Print the chart definitions as JSON
    Charts,

    /// Export the current session as a report
    Export {
        /// Report format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Discard the current session
    Clear,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
