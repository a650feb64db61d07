use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::cli::commands::Command;
use crate::config::PesajesConfig;

pub struct InitConfigCommand {
    path: PathBuf,
    force: bool,
}

impl InitConfigCommand {
    pub fn new(path: PathBuf, force: bool) -> Self {
        Self { path, force }
    }

    fn write(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists; use --force to overwrite it",
                self.path.display()
            );
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        PesajesConfig::default().save_to_file(&self.path)?;
        Ok(())
    }
}

impl Command for InitConfigCommand {
    async fn execute(&self) -> Result<()> {
        self.write()?;
        println!("✅ Configuración escrita en {}", self.path.display());
        println!("   💡 Defina BOT_TOKEN y GROUP_CHAT_ID en el entorno o en .env");
        Ok(())
    }
}
