//! Persistence gateway
//!
//! `RecordStore` is the narrow contract the dispatcher calls on confirmation.
//! `JsonLinesRecordStore` appends one JSON document per record and is the
//! store used when no database is configured.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::GatewayError;
use crate::weighing::record::WeighingRecord;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a confirmed record
    async fn save(&self, record: &WeighingRecord) -> Result<(), GatewayError>;

    /// Most recent records, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<WeighingRecord>, GatewayError>;

    /// Release held resources before the host exits
    async fn close(&self) {}
}

pub struct JsonLinesRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesRecordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for JsonLinesRecordStore {
    async fn save(&self, record: &WeighingRecord) -> Result<(), GatewayError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(record_id = %record.id, path = %self.path.display(), "Record appended");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<WeighingRecord>, GatewayError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .take(limit)
            .map(|line| serde_json::from_str(line).map_err(GatewayError::from))
            .collect()
    }
}
