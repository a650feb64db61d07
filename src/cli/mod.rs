use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "pesajes")]
#[command(version)]
#[command(about = "Chat-driven weighing registration for livestock, feed and fuel loads")]
#[command(long_about = "Pesajes walks truck drivers through a weighing registration: identity, plate, \
                       cargo, scale, counts, weight and photos, then stores the record and notifies the \
                       operations group. Try it locally with 'pesajes console'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the registration dialogue over stdin/stdout
    Console {
        /// Chat id the console session acts as
        #[arg(long, default_value = "1", help = "Actor id used for the console session")]
        actor: i64,
    },
    /// Write the default configuration file
    InitConfig {
        /// Destination file
        #[arg(long, default_value = "pesajes.toml", help = "Where to write the configuration")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long, help = "Overwrite the file if it already exists")]
        force: bool,
    },
    /// Show the most recent stored weighings
    Recent {
        /// Number of records to show
        #[arg(long, default_value = "10", help = "Maximum number of records to list")]
        limit: usize,
    },
}
