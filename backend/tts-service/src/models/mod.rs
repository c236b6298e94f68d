/// Domain entities and HTTP payloads for tts-service
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// ========================================
// Value ranges
// ========================================

pub const RATE_RANGE: (f32, f32) = (0.1, 10.0);
pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

/// MIME type recorded for every stored blob
pub const AUDIO_MPEG: &str = "audio/mpeg";

// ========================================
// Entities
// ========================================

/// Registered identity. The digest is never serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A text-to-speech submission, optionally pointing at an uploaded audio file.
///
/// `media_id` is a weak reference: several conversions may share one media
/// row and none of them owns it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    #[serde(rename = "voiceURI")]
    pub voice_uri: String,
    pub voice_name: String,
    pub voice_lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog row for a stored audio blob. `filename` is the storage key under
/// the media root and is derived from `id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub mime: String,
    #[serde(rename = "size")]
    pub size_bytes: i64,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

impl MediaFile {
    pub fn storage_key_for(id: Uuid) -> String {
        format!("{}.mp3", id)
    }
}

// ========================================
// Cleanup outcomes
// ========================================

/// Result of a conditional media deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCleanup {
    /// Blob and catalog row were removed
    Deleted,
    /// Other conversions still point at the media; nothing was touched
    StillReferenced(i64),
    /// No catalog row for this owner (already gone, or owned by someone else)
    Missing,
}

/// Best-effort cleanup outcome reported next to a successful conversion delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupReport {
    /// The conversion had no media attached
    NoMedia,
    Completed(MediaCleanup),
    /// Cleanup errored; the conversion delete still stands
    Failed(String),
}

// ========================================
// Auth payloads
// ========================================

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "crate::validators::validate_email_shape"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
    pub expires_at: String,
}

// ========================================
// Conversion payloads
// ========================================

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversionRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[serde(rename = "voiceURI")]
    #[validate(length(min = 1, max = 255))]
    pub voice_uri: String,
    #[validate(length(min = 1, max = 255))]
    pub voice_name: String,
    #[validate(length(min = 1, max = 32))]
    pub voice_lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    #[serde(default)]
    pub media_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionListResponse {
    pub items: Vec<Conversion>,
    pub next_cursor: Option<String>,
}

// ========================================
// Media payloads
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub filename: String,
}

impl From<&MediaFile> for UploadResponse {
    fn from(media: &MediaFile) -> Self {
        Self {
            id: media.id,
            filename: media.filename.clone(),
        }
    }
}
