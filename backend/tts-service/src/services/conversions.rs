/// Conversion service - create, list and delete text-to-speech records
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{
    CleanupReport, Conversion, CreateConversionRequest, PITCH_RANGE, RATE_RANGE, VOLUME_RANGE,
};
use crate::services::media::MediaStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Most recent conversions returned by a list call
pub const LIST_LIMIT: i64 = 50;

/// A successful delete together with what happened to the attached media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub conversion_id: Uuid,
    pub cleanup: CleanupReport,
}

#[derive(Clone)]
pub struct ConversionStore {
    repo: Arc<dyn Store>,
    media: MediaStore,
}

/// Out-of-range values are pulled to the nearest bound
fn clamp(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

impl ConversionStore {
    pub fn new(repo: Arc<dyn Store>, media: MediaStore) -> Self {
        Self { repo, media }
    }

    /// Store a conversion. `media_id` is not checked for existence.
    pub async fn create(&self, owner_id: Uuid, req: CreateConversionRequest) -> Result<Conversion> {
        req.validate()?;

        let now = Utc::now();
        let conversion = Conversion {
            id: Uuid::new_v4(),
            user_id: owner_id,
            text: req.text,
            voice_uri: req.voice_uri,
            voice_name: req.voice_name,
            voice_lang: req.voice_lang,
            rate: clamp(req.rate, RATE_RANGE),
            pitch: clamp(req.pitch, PITCH_RANGE),
            volume: clamp(req.volume, VOLUME_RANGE),
            media_id: req.media_id,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_conversion(&conversion).await?;

        tracing::info!(
            conversion_id = %conversion.id,
            user_id = %owner_id,
            media_id = ?conversion.media_id,
            "conversion created"
        );
        Ok(conversion)
    }

    /// Newest first, at most [`LIST_LIMIT`]
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Conversion>> {
        self.repo.list_conversions(owner_id, LIST_LIMIT).await
    }

    /// Delete an owned conversion, then try to drop its media if nothing else
    /// points at it. Cleanup failures are reported in the outcome, never as an
    /// error.
    pub async fn delete(&self, owner_id: Uuid, conversion_id: Uuid) -> Result<DeleteOutcome> {
        let conversion = self
            .repo
            .find_conversion(owner_id, conversion_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let media_id = conversion.media_id;

        if !self.repo.delete_conversion(owner_id, conversion_id).await? {
            // Lost a race with a concurrent delete of the same row.
            return Err(AppError::NotFound);
        }

        let cleanup = match media_id {
            None => CleanupReport::NoMedia,
            Some(media_id) => match self.media.delete_if_unreferenced(owner_id, media_id).await {
                Ok(result) => CleanupReport::Completed(result),
                Err(e) => {
                    tracing::warn!(
                        conversion_id = %conversion_id,
                        media_id = %media_id,
                        error = %e,
                        "media cleanup failed after conversion delete"
                    );
                    CleanupReport::Failed(e.to_string())
                }
            },
        };

        tracing::info!(
            conversion_id = %conversion_id,
            user_id = %owner_id,
            cleanup = ?cleanup,
            "conversion deleted"
        );
        Ok(DeleteOutcome {
            conversion_id,
            cleanup,
        })
    }
}
