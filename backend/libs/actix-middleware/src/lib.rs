//! # Actix Middleware Library
//!
//! Middleware components shared by the TTS Actix services
//!
//! ## Modules
//! - `jwt_auth`: Bearer session-token authentication

pub mod jwt_auth;

pub use jwt_auth::{authenticate, AuthError, AuthenticatedUser, JwtAuthMiddleware};
