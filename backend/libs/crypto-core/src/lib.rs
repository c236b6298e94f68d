//! Shared cryptographic helpers for the TTS backend
//!
//! - `jwt`: HS256 session token issuance and stateless verification
//! - `hash`: SHA-256 checksums, including an incremental accumulator for
//!   streamed uploads

pub mod hash;
pub mod jwt;

pub use hash::{sha256, sha256_hex, Sha256Accumulator};
pub use jwt::{Claims, IssuedToken, TokenCodec, TokenError};
