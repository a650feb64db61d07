//! Gateways to the services the registration flow depends on
//!
//! The flow never touches storage or chat delivery directly. Each concern is a
//! trait so the dispatcher can be driven with in-memory fakes in tests.

pub mod images;
pub mod notifier;
pub mod records;

use std::sync::Arc;
use thiserror::Error;

use crate::config::PesajesConfig;

pub use images::{ImageMetadata, ImageStore, LocalImageStore};
pub use notifier::{ConsoleNotifier, Notifier};
pub use records::{JsonLinesRecordStore, RecordStore};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    #[error("Database error: {message}")]
    Database { message: String },
    #[error("Notification delivery failed: {message}")]
    Delivery { message: String },
    #[error("Corrupt stored record: {message}")]
    Corrupt { message: String },
}

/// The set of gateways handed to the dispatcher
#[derive(Clone)]
pub struct Gateways {
    pub records: Arc<dyn RecordStore>,
    pub images: Arc<dyn ImageStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Gateways {
    /// Build the record and image gateways described by the configuration.
    ///
    /// With the `database` feature and a configured database the SQLite store
    /// is used; otherwise records go to the JSON-lines file.
    pub async fn from_config(
        config: &PesajesConfig,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let records = record_store(config).await?;
        let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(&config.images.directory));

        Ok(Self {
            records,
            images,
            notifier,
        })
    }
}

#[cfg(feature = "database")]
pub async fn record_store(config: &PesajesConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if let Some(database) = &config.database {
        let manager = crate::database::DatabaseManager::new(
            &database.url,
            database.max_connections,
            database.auto_migrate,
        )
        .await?;
        return Ok(Arc::new(manager));
    }
    Ok(Arc::new(JsonLinesRecordStore::new(&config.records.path)))
}

#[cfg(not(feature = "database"))]
pub async fn record_store(config: &PesajesConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if config.database.is_some() {
        tracing::warn!("Database configured but the `database` feature is disabled; using JSON-lines store");
    }
    Ok(Arc::new(JsonLinesRecordStore::new(&config.records.path)))
}
