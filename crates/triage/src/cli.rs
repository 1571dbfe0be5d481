//! Command-line interface definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Triage board engine
///
/// Classifies tracker work items (issues and pull requests) into named
/// buckets using a declarative rule language. Designed for deterministic,
/// machine-friendly outputs.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Resource not found (file, collection)
///   4  - Configuration validation failed
///  10  - External dependency failed (file system, codec)
#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Rule-driven triage board engine", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration file, reporting every error found
    Check {
        /// Path to the configuration file (.yaml or .toml)
        #[arg(long)]
        config: PathBuf,

        /// Output result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a snapshot of work items against a configuration
    Classify {
        /// Path to the configuration file (.yaml or .toml)
        #[arg(long)]
        config: PathBuf,

        /// Path to the JSON snapshot file
        #[arg(long)]
        snapshot: PathBuf,

        /// Evaluation time as RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<String>,

        /// Limit output to one collection id
        #[arg(long)]
        collection: Option<String>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the rules defined in a configuration
    Rules {
        /// Path to the configuration file (.yaml or .toml)
        #[arg(long)]
        config: PathBuf,

        /// Output result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON Schema for an input or output document
    Schema {
        /// Which schema: config, snapshot, or result
        target: String,
    },
}
