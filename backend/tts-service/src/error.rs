/// Error types for tts-service
///
/// Every failure a handler can produce is an [`AppError`]; actix renders it as
/// an [`ErrorResponse`] body. Database and storage details are logged, never
/// returned to the caller.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::TokenError;
use error_types::{error_codes, error_keys, error_types as categories, ErrorResponse};

/// Result type for tts-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A file is required")]
    FileRequired,

    #[error("File exceeds the upload size limit")]
    FileTooLarge,

    #[error("Only .mp3 files are supported")]
    UnsupportedFormat,

    #[error("Unauthorized")]
    Unauthorized,

    /// Shared by unknown email and wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn descriptor(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            AppError::Validation(_) => (
                error_keys::VALIDATION,
                categories::VALIDATION_ERROR,
                error_codes::VALIDATION_ERROR,
            ),
            AppError::FileRequired => (
                error_keys::FILE_REQUIRED,
                categories::VALIDATION_ERROR,
                error_codes::FILE_REQUIRED,
            ),
            AppError::FileTooLarge => (
                error_keys::FILE_TOO_LARGE,
                categories::VALIDATION_ERROR,
                error_codes::UPLOAD_TOO_LARGE,
            ),
            AppError::UnsupportedFormat => (
                error_keys::ONLY_MP3,
                categories::VALIDATION_ERROR,
                error_codes::UNSUPPORTED_FORMAT,
            ),
            AppError::Unauthorized => (
                error_keys::UNAUTHORIZED,
                categories::AUTHENTICATION_ERROR,
                error_codes::TOKEN_INVALID,
            ),
            AppError::InvalidCredentials => (
                error_keys::INVALID_CREDENTIALS,
                categories::AUTHENTICATION_ERROR,
                error_codes::INVALID_CREDENTIALS,
            ),
            AppError::NotFound => (
                error_keys::NOT_FOUND,
                categories::NOT_FOUND_ERROR,
                error_codes::NOT_FOUND,
            ),
            AppError::Conflict(_) => (
                error_keys::EMAIL_IN_USE,
                categories::CONFLICT_ERROR,
                error_codes::EMAIL_ALREADY_EXISTS,
            ),
            AppError::Database(_) => (
                error_keys::DB_ERROR,
                categories::SERVER_ERROR,
                error_codes::DATABASE_ERROR,
            ),
            AppError::Storage(_) => (
                error_keys::STORAGE_ERROR,
                categories::SERVER_ERROR,
                error_codes::STORAGE_ERROR,
            ),
            AppError::Internal(_) => (
                error_keys::INTERNAL,
                categories::SERVER_ERROR,
                error_codes::INTERNAL_SERVER_ERROR,
            ),
        }
    }

    /// Message safe to show to the client
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::Conflict(_) => "Email already registered".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::FileRequired | AppError::UnsupportedFormat => {
                StatusCode::BAD_REQUEST
            }
            AppError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let (key, error_type, code) = self.descriptor();
        let response = ErrorResponse::new(
            key,
            &self.public_message(),
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AppError::Internal(msg),
            TokenError::Expired | TokenError::Invalid(_) => AppError::Unauthorized,
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::FileTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(AppError::UnsupportedFormat.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Storage("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database("relation \"users\" does not exist".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.descriptor().0, error_keys::DB_ERROR);
    }

    #[test]
    fn test_token_errors_become_unauthorized() {
        assert!(matches!(
            AppError::from(TokenError::Expired),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(TokenError::Signing("key".into())),
            AppError::Internal(_)
        ));
    }
}
