use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::commands::Command;
use crate::config::init_config;
use crate::external::{ConsoleNotifier, Gateways};
use crate::observability::flow_metrics;
use crate::weighing::{ActorId, IncomingMessage, WeighingDispatcher};

const START_COMMAND: &str = "/start";
const PHOTO_COMMAND: &str = "/foto";
const QUIT_COMMAND: &str = "/salir";

/// One line typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Empty,
    Quit,
    Start,
    Photo(PathBuf),
    Text(String),
}

pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    if line.eq_ignore_ascii_case(QUIT_COMMAND) {
        return ConsoleInput::Quit;
    }
    if line.eq_ignore_ascii_case(START_COMMAND) {
        return ConsoleInput::Start;
    }
    if let Some(path) = line
        .strip_prefix(PHOTO_COMMAND)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .filter(|path| !path.is_empty())
    {
        return ConsoleInput::Photo(PathBuf::from(path));
    }
    ConsoleInput::Text(line.to_string())
}

pub struct ConsoleCommand {
    actor: ActorId,
}

impl ConsoleCommand {
    pub fn new(actor: i64) -> Self {
        Self {
            actor: ActorId(actor),
        }
    }
}

impl Command for ConsoleCommand {
    async fn execute(&self) -> Result<()> {
        let config = init_config()?;
        let gateways = Gateways::from_config(config, Arc::new(ConsoleNotifier)).await?;
        let records = gateways.records.clone();
        let dispatcher = WeighingDispatcher::new(gateways, config.dispatcher_settings());

        println!("⚖️  Consola de pesajes (actor {})", self.actor);
        println!("   /start para comenzar, /foto <ruta> para enviar una foto, /salir para terminar");
        println!();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let message = match parse_line(&line) {
                ConsoleInput::Empty => continue,
                ConsoleInput::Quit => break,
                ConsoleInput::Start => IncomingMessage::start(self.actor),
                ConsoleInput::Text(text) => IncomingMessage::text(self.actor, text),
                ConsoleInput::Photo(path) => match tokio::fs::read(&path).await {
                    Ok(bytes) => IncomingMessage::photo(self.actor, bytes),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Could not read photo");
                        println!("⚠️ No se pudo leer {}: {e}", path.display());
                        continue;
                    }
                },
            };

            for reply in dispatcher.handle(message).await {
                println!("{reply}");
                println!();
            }
        }

        info!(actor = %self.actor, "Console session finished");
        flow_metrics().log_stats();
        records.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_console_commands() {
        assert_eq!(parse_line("   "), ConsoleInput::Empty);
        assert_eq!(parse_line("/salir"), ConsoleInput::Quit);
        assert_eq!(parse_line("/START"), ConsoleInput::Start);
        assert_eq!(
            parse_line("/foto ./fotos/bascula.jpg"),
            ConsoleInput::Photo(PathBuf::from("./fotos/bascula.jpg"))
        );
    }

    #[test]
    fn test_other_lines_are_text() {
        assert_eq!(parse_line(" NHU982 "), ConsoleInput::Text("NHU982".to_string()));
        assert_eq!(parse_line("/cancelar"), ConsoleInput::Text("/cancelar".to_string()));
        assert_eq!(parse_line("/foto"), ConsoleInput::Text("/foto".to_string()));
        assert_eq!(parse_line("/fotos"), ConsoleInput::Text("/fotos".to_string()));
    }
}
