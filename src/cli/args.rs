//! CLI argument structures

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generate laboratory protocols from experiment descriptions
#[derive(Parser)]
#[command(name = "protocol-forge")]
#[command(about = "protocol-forge - Generate sectioned laboratory protocols", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (defaults to ./protocol-forge.toml when present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a protocol from an experiment descriptor
    #[command(name = "generate")]
    Generate {
        /// Descriptor JSON file, or '-' for stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Protocol date (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,

        /// Skip the completion service and use the local generator
        #[arg(long)]
        offline: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Split free text into protocol sections
    #[command(name = "parse")]
    Parse {
        /// Text file, or '-' for stdin
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Derive a data collection template from a protocol
    #[command(name = "template")]
    Template {
        /// Protocol JSON file, or '-' for stdin
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run the HTTP API
    #[command(name = "serve")]
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}
