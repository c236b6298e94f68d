/// MemoryStore wrapper that fails selected media operations
use super::{ConversionRepository, MediaRepository, MemoryStore, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Conversion, MediaCleanup, MediaFile, User};
use crate::storage::BlobStore;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_media_insert: bool,
    pub fail_media_cleanup: bool,
}

#[async_trait]
impl UserRepository for FailingStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        self.inner.insert_user(user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.find_user_by_email(email).await
    }
}

#[async_trait]
impl ConversionRepository for FailingStore {
    async fn insert_conversion(&self, conversion: &Conversion) -> Result<()> {
        self.inner.insert_conversion(conversion).await
    }

    async fn list_conversions(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Conversion>> {
        self.inner.list_conversions(owner_id, limit).await
    }

    async fn find_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Conversion>> {
        self.inner.find_conversion(owner_id, id).await
    }

    async fn delete_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        self.inner.delete_conversion(owner_id, id).await
    }

    async fn count_media_references(&self, media_id: Uuid) -> Result<i64> {
        self.inner.count_media_references(media_id).await
    }
}

#[async_trait]
impl MediaRepository for FailingStore {
    async fn insert_media(&self, media: &MediaFile) -> Result<()> {
        if self.fail_media_insert {
            return Err(AppError::Database("connection reset".to_string()));
        }
        self.inner.insert_media(media).await
    }

    async fn find_media(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MediaFile>> {
        self.inner.find_media(owner_id, id).await
    }

    async fn delete_media_if_unreferenced(
        &self,
        owner_id: Uuid,
        id: Uuid,
        blobs: &BlobStore,
    ) -> Result<MediaCleanup> {
        if self.fail_media_cleanup {
            return Err(AppError::Database("lock timeout".to_string()));
        }
        self.inner
            .delete_media_if_unreferenced(owner_id, id, blobs)
            .await
    }
}
