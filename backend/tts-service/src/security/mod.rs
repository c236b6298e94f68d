/// Security primitives for tts-service
pub mod password;

pub use password::{hash_password, verify_password};
