//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Check whether three lengths form a triangle, by geometry and by model
#[derive(Parser, Debug)]
#[command(name = "trivalid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inference backend (mlp, knn). Without --model, the backend's bundled model is used
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Model file
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Scaler file
    #[arg(long, global = true)]
    pub scaler: Option<PathBuf>,

    /// Score above which the model counts as "triangle"
    #[arg(long, global = true, conflicts_with = "strict")]
    pub threshold: Option<f64>,

    /// Use the strict threshold (0.9)
    #[arg(long, global = true)]
    pub strict: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate one triple
    Check {
        /// First side
        #[arg(allow_negative_numbers = true)]
        a: String,
        /// Second side
        #[arg(allow_negative_numbers = true)]
        b: String,
        /// Third side
        #[arg(allow_negative_numbers = true)]
        c: String,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read one triple per line from stdin and report what changed
    Watch,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Destination (defaults to trivalid.toml beside the executable)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
