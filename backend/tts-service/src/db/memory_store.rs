/// In-process repositories behind a single async lock
use super::{ConversionRepository, MediaRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Conversion, MediaCleanup, MediaFile, User};
use crate::storage::BlobStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Insertion order
    conversions: Vec<Conversion>,
    media: HashMap<Uuid, MediaFile>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a catalog row without touching the blob or any reference
    pub async fn forget_media(&self, id: Uuid) -> bool {
        self.tables.write().await.media.remove(&id).is_some()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl ConversionRepository for MemoryStore {
    async fn insert_conversion(&self, conversion: &Conversion) -> Result<()> {
        self.tables
            .write()
            .await
            .conversions
            .push(conversion.clone());
        Ok(())
    }

    async fn list_conversions(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Conversion>> {
        let tables = self.tables.read().await;
        // Later inserts win ties on equal timestamps.
        let mut rows: Vec<Conversion> = tables
            .conversions
            .iter()
            .rev()
            .filter(|c| c.user_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn find_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Conversion>> {
        let tables = self.tables.read().await;
        Ok(tables
            .conversions
            .iter()
            .find(|c| c.id == id && c.user_id == owner_id)
            .cloned())
    }

    async fn delete_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.conversions.len();
        tables
            .conversions
            .retain(|c| !(c.id == id && c.user_id == owner_id));
        Ok(tables.conversions.len() < before)
    }

    async fn count_media_references(&self, media_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(count_references(&tables, media_id))
    }
}

#[async_trait]
impl MediaRepository for MemoryStore {
    async fn insert_media(&self, media: &MediaFile) -> Result<()> {
        self.tables
            .write()
            .await
            .media
            .insert(media.id, media.clone());
        Ok(())
    }

    async fn find_media(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MediaFile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .media
            .get(&id)
            .filter(|m| m.user_id == owner_id)
            .cloned())
    }

    async fn delete_media_if_unreferenced(
        &self,
        owner_id: Uuid,
        id: Uuid,
        blobs: &BlobStore,
    ) -> Result<MediaCleanup> {
        // Write lock held for the whole check-then-delete sequence.
        let mut tables = self.tables.write().await;

        let filename = match tables.media.get(&id) {
            Some(media) if media.user_id == owner_id => media.filename.clone(),
            _ => return Ok(MediaCleanup::Missing),
        };

        let references = count_references(&tables, id);
        if references > 0 {
            return Ok(MediaCleanup::StillReferenced(references));
        }

        blobs.remove(&filename).await?;
        tables.media.remove(&id);

        info!(media_id = %id, user_id = %owner_id, "orphaned media removed");
        Ok(MediaCleanup::Deleted)
    }
}

fn count_references(tables: &Tables, media_id: Uuid) -> i64 {
    tables
        .conversions
        .iter()
        .filter(|c| c.media_id == Some(media_id))
        .count() as i64
}
