use anyhow::Result;
use clap::Parser;

use pesajes::cli::commands::console::ConsoleCommand;
use pesajes::cli::commands::init_config::InitConfigCommand;
use pesajes::cli::commands::recent::RecentCommand;
use pesajes::cli::commands::{show_how_to_start, Command};
use pesajes::cli::{Cli, Commands};
use pesajes::{config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging follows the configuration when it loads; a broken config is reported by the command itself
    let (log_level, json_logs) = match config() {
        Ok(config) => (
            config.observability.log_level.clone(),
            config.observability.json_logs,
        ),
        Err(_) => ("info".to_string(), false),
    };
    init_telemetry(&log_level, json_logs)?;

    match cli.command {
        // Default behavior: no subcommand - explain how to start
        None => tokio::runtime::Runtime::new()?.block_on(async { show_how_to_start().await }),
        Some(Commands::Console { actor }) => tokio::runtime::Runtime::new()?
            .block_on(async { ConsoleCommand::new(actor).execute().await }),
        Some(Commands::InitConfig { path, force }) => tokio::runtime::Runtime::new()?
            .block_on(async { InitConfigCommand::new(path, force).execute().await }),
        Some(Commands::Recent { limit }) => tokio::runtime::Runtime::new()?
            .block_on(async { RecentCommand::new(limit).execute().await }),
    }
}
