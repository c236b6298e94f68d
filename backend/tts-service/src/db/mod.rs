//! Persistence layer
//!
//! One repository trait per aggregate. [`PgStore`] is the production backend;
//! [`MemoryStore`] serves local runs without `DATABASE_URL` and the test suite.

#[cfg(test)]
pub(crate) mod failing_store;
pub mod memory_store;
pub mod pg_store;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;

use crate::error::Result;
use crate::models::{Conversion, MediaCleanup, MediaFile, User};
use crate::storage::BlobStore;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is taken
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// `email` must already be normalized
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait ConversionRepository: Send + Sync {
    async fn insert_conversion(&self, conversion: &Conversion) -> Result<()>;

    /// Owner's conversions, newest first
    async fn list_conversions(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Conversion>>;

    async fn find_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Conversion>>;

    /// Returns false when no row matched
    async fn delete_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<bool>;

    /// Number of conversions (any owner) pointing at `media_id`
    async fn count_media_references(&self, media_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn insert_media(&self, media: &MediaFile) -> Result<()>;

    async fn find_media(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MediaFile>>;

    /// Remove blob and catalog row if no conversion references the media.
    ///
    /// Reference count, blob removal and row removal happen in one
    /// transactional scope. A concurrent caller that loses the race sees
    /// `Missing`, never an error.
    async fn delete_media_if_unreferenced(
        &self,
        owner_id: Uuid,
        id: Uuid,
        blobs: &BlobStore,
    ) -> Result<MediaCleanup>;
}

/// Everything the service needs from a backend
pub trait Store: UserRepository + ConversionRepository + MediaRepository {}

impl<T> Store for T where T: UserRepository + ConversionRepository + MediaRepository {}
