use clap::Parser;
use protocol_forge::app::{handle_fatal_error, init_logging, AppConfig};
use protocol_forge::cli::{execute_command, Cli};
use protocol_forge::config::load_config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => handle_fatal_error(e.into(), cli.verbose),
    };
    let loaded = load_config(cli.config.as_deref(), &working_dir).await;

    let mut app_config = AppConfig::new(cli.verbose);
    if let Ok(config) = &loaded {
        app_config = app_config.with_configured_level(config.log_level.clone());
    }
    init_logging(&app_config);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => handle_fatal_error(e.into(), cli.verbose),
    };

    if let Err(e) = execute_command(cli.command, &config).await {
        handle_fatal_error(e, cli.verbose);
    }
}
