// Image store gateway: photo bytes in, reference out

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use super::GatewayError;
use crate::weighing::types::{ActorId, ImageKind, ImageRef};

/// What the store knows about a photo besides its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub actor: ActorId,
    pub transaction_id: Uuid,
    pub plate: Option<String>,
    pub kind: ImageKind,
    pub received_at: DateTime<Utc>,
}

impl ImageMetadata {
    /// File name the photo is stored under. The transaction suffix keeps two
    /// photos of the same plate and kind taken in the same second apart.
    pub fn file_name(&self) -> String {
        let plate = self
            .plate
            .as_deref()
            .filter(|plate| !plate.is_empty())
            .unwrap_or("SIN_PLACA");
        let transaction = self.transaction_id.simple().to_string();
        format!(
            "pesaje_{}_{}_{}_{}.jpg",
            plate,
            self.kind.as_str(),
            self.received_at.format("%Y%m%d_%H%M%S"),
            &transaction[..8]
        )
    }
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, bytes: &[u8], metadata: &ImageMetadata) -> Result<ImageRef, GatewayError>;
}

/// Writes photos into a local folder
pub struct LocalImageStore {
    directory: PathBuf,
}

impl LocalImageStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, bytes: &[u8], metadata: &ImageMetadata) -> Result<ImageRef, GatewayError> {
        fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(metadata.file_name());
        fs::write(&path, bytes).await?;

        let absolute = fs::canonicalize(&path).await?;
        info!(
            actor = %metadata.actor,
            kind = metadata.kind.as_str(),
            path = %absolute.display(),
            bytes = bytes.len(),
            "Photo stored"
        );
        Ok(ImageRef::new(absolute.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const TRANSACTION: &str = "5f0c2a9e-1b7d-4c3e-9a21-0d6e8f4b7c11";

    fn metadata(plate: Option<&str>) -> ImageMetadata {
        ImageMetadata {
            actor: ActorId(3),
            transaction_id: TRANSACTION.parse().unwrap(),
            plate: plate.map(str::to_string),
            kind: ImageKind::Weight,
            received_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
        }
    }

    #[test]
    fn test_file_name_pattern() {
        assert_eq!(
            metadata(Some("NHU982")).file_name(),
            "pesaje_NHU982_pesaje_20240309_140507_5f0c2a9e.jpg"
        );
        assert_eq!(
            metadata(None).file_name(),
            "pesaje_SIN_PLACA_pesaje_20240309_140507_5f0c2a9e.jpg"
        );
    }

    #[tokio::test]
    async fn test_same_second_photos_from_two_transactions_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = LocalImageStore::new(dir.path());

        let first = metadata(Some("NHU982"));
        let second = ImageMetadata {
            transaction_id: Uuid::new_v4(),
            ..first.clone()
        };

        let a = store.store(b"first", &first).await.unwrap();
        let b = store.store(b"second", &second).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read(a.as_str()).unwrap(), b"first");
        assert_eq!(std::fs::read(b.as_str()).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_store_writes_bytes_and_returns_absolute_path() {
        let dir = TempDir::new().unwrap();
        let store = LocalImageStore::new(dir.path().join("fotos"));

        let reference = store.store(b"jpeg-bytes", &metadata(Some("NHU982"))).await.unwrap();
        let path = Path::new(reference.as_str());

        assert!(path.is_absolute());
        assert_eq!(std::fs::read(path).unwrap(), b"jpeg-bytes");
    }
}
