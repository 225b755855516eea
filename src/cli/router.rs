//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::ForgeConfig;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Option<Commands>, config: &ForgeConfig) -> Result<()> {
    match command {
        Some(Commands::Generate {
            input,
            date,
            offline,
            format,
        }) => run_generate_command(&input, date, offline, format, config).await,
        Some(Commands::Parse { input, format }) => run_parse_command(&input, format).await,
        Some(Commands::Template { input }) => run_template_command(&input).await,
        Some(Commands::Serve { bind }) => run_serve_command(bind, config).await,
        None => {
            println!("No command given. Run 'protocol-forge --help' for usage.");
            Ok(())
        }
    }
}
