/// Media service - audio ingestion, lookup and reference-counted removal
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{MediaCleanup, MediaFile, AUDIO_MPEG};
use crate::storage::{BlobStore, StagedBlob};
use bytes::Bytes;
use chrono::Utc;
use crypto_core::Sha256Accumulator;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

const SUPPORTED_EXTENSION: &str = ".mp3";

#[derive(Clone)]
pub struct MediaStore {
    repo: Arc<dyn Store>,
    blobs: BlobStore,
    max_upload_bytes: u64,
}

/// Upfront checks, in order: presence, size ceiling, extension.
///
/// `declared_size` is a lower bound when known; the ceiling is enforced again
/// while streaming.
pub fn check_upload(
    filename: Option<&str>,
    declared_size: Option<u64>,
    max_upload_bytes: u64,
) -> Result<()> {
    let filename = filename
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or(AppError::FileRequired)?;

    if declared_size.is_some_and(|size| size > max_upload_bytes) {
        return Err(AppError::FileTooLarge);
    }

    if !filename.to_lowercase().ends_with(SUPPORTED_EXTENSION) {
        return Err(AppError::UnsupportedFormat);
    }

    Ok(())
}

impl MediaStore {
    pub fn new(repo: Arc<dyn Store>, blobs: BlobStore, max_upload_bytes: u64) -> Self {
        Self {
            repo,
            blobs,
            max_upload_bytes,
        }
    }

    /// Validate, stream to disk while hashing, then record the catalog row.
    ///
    /// The blob is in place before the row is written, so a row never points
    /// at a missing blob.
    pub async fn ingest<S, E>(
        &self,
        owner_id: Uuid,
        filename: Option<&str>,
        declared_size: Option<u64>,
        stream: S,
    ) -> Result<MediaFile>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Display,
    {
        check_upload(filename, declared_size, self.max_upload_bytes)?;

        let id = Uuid::new_v4();
        let key = MediaFile::storage_key_for(id);

        let mut staged = self.blobs.create_staging(&key).await?;
        let mut hasher = Sha256Accumulator::new();

        if let Err(e) = copy_stream(stream, &mut staged, &mut hasher, self.max_upload_bytes).await
        {
            staged.discard().await;
            return Err(e);
        }
        staged.commit().await?;

        let (checksum, size) = hasher.finalize_hex();
        let media = MediaFile {
            id,
            user_id: owner_id,
            filename: key,
            mime: AUDIO_MPEG.to_string(),
            size_bytes: i64::try_from(size).map_err(|_| AppError::FileTooLarge)?,
            checksum,
            created_at: Utc::now(),
        };

        if let Err(e) = self.repo.insert_media(&media).await {
            if let Err(cleanup) = self.blobs.remove(&media.filename).await {
                tracing::warn!(
                    media_id = %id,
                    error = %cleanup,
                    "failed to remove blob after catalog insert failure"
                );
            }
            return Err(e);
        }

        tracing::info!(
            media_id = %id,
            user_id = %owner_id,
            size_bytes = media.size_bytes,
            "media stored"
        );
        Ok(media)
    }

    /// Owner-scoped lookup; another owner's media reads as absent
    pub async fn fetch(&self, owner_id: Uuid, media_id: Uuid) -> Result<(MediaFile, PathBuf)> {
        let media = self
            .repo
            .find_media(owner_id, media_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let path = self.blobs.path_for(&media.filename);
        Ok((media, path))
    }

    /// Remove media nobody references any more. Only the conversion delete
    /// path calls this.
    pub(crate) async fn delete_if_unreferenced(
        &self,
        owner_id: Uuid,
        media_id: Uuid,
    ) -> Result<MediaCleanup> {
        self.repo
            .delete_media_if_unreferenced(owner_id, media_id, &self.blobs)
            .await
    }
}

async fn copy_stream<S, E>(
    stream: S,
    staged: &mut StagedBlob,
    hasher: &mut Sha256Accumulator,
    max_upload_bytes: u64,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::Validation(format!("upload interrupted: {}", e)))?;
        if hasher.total_bytes() + chunk.len() as u64 > max_upload_bytes {
            return Err(AppError::FileTooLarge);
        }
        hasher.update(&chunk);
        staged.write_chunk(&chunk).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::failing_store::FailingStore;
    use crate::db::MemoryStore;
    use futures::stream;
    use std::convert::Infallible;
    use tempfile::TempDir;

    const MAX: u64 = 20 * 1024 * 1024;

    fn body(chunks: Vec<&'static str>) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> {
        stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes()))),
        )
    }

    fn media_store(dir: &TempDir) -> MediaStore {
        MediaStore::new(Arc::new(MemoryStore::new()), BlobStore::new(dir.path()), MAX)
    }

    #[test]
    fn test_check_order() {
        assert!(matches!(check_upload(None, Some(MAX + 1), MAX), Err(AppError::FileRequired)));
        assert!(matches!(
            check_upload(Some("voice.wav"), Some(MAX + 1), MAX),
            Err(AppError::FileTooLarge)
        ));
        assert!(matches!(
            check_upload(Some("voice.wav"), Some(10), MAX),
            Err(AppError::UnsupportedFormat)
        ));
        assert!(check_upload(Some("voice.MP3"), Some(10), MAX).is_ok());
        assert!(check_upload(Some("voice.mp3"), None, MAX).is_ok());
    }

    #[tokio::test]
    async fn test_ingest_mixed_case_extension() {
        let dir = TempDir::new().unwrap();
        let media = media_store(&dir);
        let owner = Uuid::new_v4();

        let stored = media
            .ingest(owner, Some("voice.MP3"), Some(10), body(vec!["0123", "456789"]))
            .await
            .unwrap();

        assert_eq!(stored.size_bytes, 10);
        assert_eq!(stored.mime, "audio/mpeg");
        assert_eq!(stored.filename, format!("{}.mp3", stored.id));
        assert_eq!(stored.checksum, crypto_core::sha256_hex(b"0123456789"));

        let (found, path) = media.fetch(owner, stored.id).await.unwrap();
        assert_eq!(found, stored);
        assert_eq!(std::fs::read(path).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_stream_over_ceiling_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let media = MediaStore::new(Arc::new(MemoryStore::new()), BlobStore::new(dir.path()), 8);

        let err = media
            .ingest(Uuid::new_v4(), Some("big.mp3"), None, body(vec!["01234", "56789"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::FileTooLarge));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_is_owner_scoped() {
        let dir = TempDir::new().unwrap();
        let media = media_store(&dir);
        let owner = Uuid::new_v4();
        let stored = media
            .ingest(owner, Some("a.mp3"), None, body(vec!["abc"]))
            .await
            .unwrap();

        assert!(matches!(
            media.fetch(Uuid::new_v4(), stored.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            media.fetch(owner, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unreferenced_media_is_removed_with_blob() {
        let dir = TempDir::new().unwrap();
        let media = media_store(&dir);
        let owner = Uuid::new_v4();
        let stored = media
            .ingest(owner, Some("a.mp3"), None, body(vec!["abc"]))
            .await
            .unwrap();

        assert_eq!(
            media.delete_if_unreferenced(owner, stored.id).await.unwrap(),
            MediaCleanup::Deleted
        );
        assert!(!dir.path().join(&stored.filename).exists());
        assert!(matches!(media.fetch(owner, stored.id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_blob_removed_when_catalog_insert_fails() {
        let dir = TempDir::new().unwrap();
        let store = FailingStore {
            fail_media_insert: true,
            ..FailingStore::default()
        };
        let media = MediaStore::new(Arc::new(store), BlobStore::new(dir.path()), MAX);

        let err = media
            .ingest(Uuid::new_v4(), Some("a.mp3"), None, body(vec!["abc"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
