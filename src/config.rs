use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::weighing::DispatcherSettings;

/// Main configuration structure for the weighing bot
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PesajesConfig {
    /// Chat bot settings
    pub bot: BotConfig,
    /// Session registry settings
    pub sessions: SessionConfig,
    /// Photo storage
    pub images: ImageConfig,
    /// JSON-lines record store, used when no database is configured
    pub records: RecordsConfig,
    /// Database settings (optional)
    pub database: Option<DatabaseConfig>,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BotConfig {
    /// Bot token (can be set via BOT_TOKEN). Reserved for the chat transport;
    /// the console host does not read it.
    pub token: Option<String>,
    /// Group chat that receives alerts and summaries
    pub group_chat_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Minutes of inactivity before an unfinished session is dropped
    pub idle_timeout_minutes: u64,
    /// Upper bound on concurrently tracked sessions
    pub max_sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageConfig {
    /// Folder photos are written to
    pub directory: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecordsConfig {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl DatabaseConfig {
    /// Database settings from a bare `DATABASE_URL`. Only SQLite URLs are
    /// usable; anything else is ignored so the JSON-lines store stays active.
    pub fn from_fallback_url(url: String) -> Option<Self> {
        if !url.starts_with("sqlite:") {
            tracing::warn!(
                scheme = url.split(':').next().unwrap_or_default(),
                "Ignoring DATABASE_URL: only sqlite: URLs are supported"
            );
            return None;
        }
        Some(Self {
            url,
            max_connections: 5,
            auto_migrate: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for PesajesConfig {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: None, // Read from BOT_TOKEN or .pesajes-rc
                group_chat_id: None,
            },
            sessions: SessionConfig {
                idle_timeout_minutes: 30,
                max_sessions: 10_000,
            },
            images: ImageConfig {
                directory: "fotos_pesajes".to_string(),
            },
            records: RecordsConfig {
                path: ".pesajes/pesajes.jsonl".to_string(),
            },
            database: None,
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl PesajesConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (pesajes.toml, .pesajes-rc)
    /// 3. Environment variables (prefixed with PESAJES__)
    /// 4. BOT_TOKEN, GROUP_CHAT_ID and DATABASE_URL when the above leave them unset
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`PesajesConfig::load`] with config files looked up in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let defaults = Config::try_from(&PesajesConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        let toml_path = dir.join("pesajes.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".pesajes-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("PESAJES")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut pesajes_config: PesajesConfig = builder.build()?.try_deserialize()?;

        if pesajes_config.bot.token.is_none() {
            pesajes_config.bot.token = std::env::var("BOT_TOKEN").ok();
        }
        if pesajes_config.bot.group_chat_id.is_none() {
            pesajes_config.bot.group_chat_id = std::env::var("GROUP_CHAT_ID").ok();
        }
        if pesajes_config.database.is_none() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                pesajes_config.database = DatabaseConfig::from_fallback_url(url);
            }
        }

        Ok(pesajes_config)
    }

    /// Settings for the session registry
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            idle_timeout: Duration::from_secs(self.sessions.idle_timeout_minutes * 60),
            max_sessions: self.sessions.max_sessions,
            broadcast_target: self.bot.group_chat_id.clone(),
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PesajesConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = PesajesConfig::load_env_file();
        PesajesConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PesajesConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<&'static PesajesConfig> {
    let config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(config)
}
