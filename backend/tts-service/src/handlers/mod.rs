/// HTTP handlers for tts-service
///
/// - Health: liveness check
/// - Auth: registration and login
/// - Conversions: create, list and delete (authenticated)
/// - Media: mp3 upload and download (authenticated)
pub mod auth;
pub mod conversions;
pub mod health;
pub mod media;

use crate::error::AppError;
use actix_middleware::JwtAuthMiddleware;
use actix_web::web;
use crypto_core::TokenCodec;
use std::sync::Arc;

pub use auth::{login, register};
pub use conversions::{create_conversion, delete_conversion, list_conversions};
pub use health::health;
pub use media::{download_media, upload_media};

/// Malformed JSON bodies render as validation errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

/// Register every route. Conversion and media scopes sit behind the JWT gate.
pub fn configure(cfg: &mut web::ServiceConfig, codec: Arc<TokenCodec>) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login)),
        )
        .service(
            web::scope("/api/conversions")
                .wrap(JwtAuthMiddleware::new(codec.clone()))
                .service(
                    web::resource("")
                        .route(web::post().to(create_conversion))
                        .route(web::get().to(list_conversions)),
                )
                .route("/{id}", web::delete().to(delete_conversion)),
        )
        .service(
            web::scope("/api/media")
                .wrap(JwtAuthMiddleware::new(codec))
                .service(web::resource("").route(web::post().to(upload_media)))
                .route("/{id}", web::get().to(download_media)),
        );
}
