//! TTS Service
//!
//! Tracks text-to-speech conversions for authenticated users and stores the
//! mp3 files attached to them. Media is reference-counted across conversions
//! and removed together with its blob once the last referencing conversion
//! is deleted.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;
pub mod services;
pub mod storage;
pub mod validators;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};

use crate::config::MediaConfig;
use crate::db::Store;
use crate::services::{ConversionStore, CredentialStore, MediaStore};
use crate::storage::BlobStore;
use crypto_core::TokenCodec;
use std::sync::Arc;

/// Shared handler state, registered once as `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub media: MediaStore,
    pub conversions: ConversionStore,
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, codec: Arc<TokenCodec>, media_config: &MediaConfig) -> Self {
        let media = MediaStore::new(
            store.clone(),
            BlobStore::new(media_config.dir.clone()),
            media_config.max_upload_bytes,
        );
        Self {
            credentials: CredentialStore::new(store.clone(), codec.clone()),
            conversions: ConversionStore::new(store, media.clone()),
            media,
            codec,
        }
    }
}
