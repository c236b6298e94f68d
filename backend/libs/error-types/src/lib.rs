//! Shared API error body and stable error identifiers
//!
//! Every service renders failures as an [`ErrorResponse`]. The `error` field is a
//! short snake_case key clients can switch on (`email_in_use`, `only_mp3`, ...);
//! `code` is the upper-case code used for log correlation and localisation.

use serde::{Deserialize, Serialize};

/// Unified API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable key, stable across releases
    pub error: String,

    /// Human-readable explanation
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Error category, one of [`error_types`]
    #[serde(rename = "type")]
    pub error_type: String,

    /// Upper-case error code, one of [`error_codes`]
    pub code: String,

    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Short keys placed in `ErrorResponse::error`
pub mod error_keys {
    pub const VALIDATION: &str = "validation_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const EMAIL_IN_USE: &str = "email_in_use";
    pub const NOT_FOUND: &str = "not_found";
    pub const FILE_REQUIRED: &str = "file_required";
    pub const FILE_TOO_LARGE: &str = "file_too_large";
    pub const ONLY_MP3: &str = "only_mp3";
    pub const DB_ERROR: &str = "db_error";
    pub const STORAGE_ERROR: &str = "storage_error";
    pub const INTERNAL: &str = "internal_error";
}

/// Standard error codes
pub mod error_codes {
    // Identity
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const EMAIL_ALREADY_EXISTS: &str = "EMAIL_ALREADY_EXISTS";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";

    // Media
    pub const MEDIA_NOT_FOUND: &str = "MEDIA_NOT_FOUND";
    pub const FILE_REQUIRED: &str = "FILE_REQUIRED";
    pub const UPLOAD_TOO_LARGE: &str = "UPLOAD_TOO_LARGE";
    pub const UNSUPPORTED_FORMAT: &str = "UNSUPPORTED_FORMAT";

    // Database/System
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Standard error categories
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const AUTHENTICATION_ERROR: &str = "authentication_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const CONFLICT_ERROR: &str = "conflict_error";
    pub const SERVER_ERROR: &str = "server_error";
}
