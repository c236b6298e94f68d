/// Business logic layer
pub mod conversions;
pub mod credentials;
pub mod media;

pub use conversions::{ConversionStore, DeleteOutcome, LIST_LIMIT};
pub use credentials::CredentialStore;
pub use media::MediaStore;
