use sha2::{Digest, Sha256};

/// Compute SHA256 hash of input bytes
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Lowercase hex SHA256 of input bytes
pub fn sha256_hex(input: &[u8]) -> String {
    hex::encode(sha256(input))
}

/// Incremental SHA256 over a byte stream that also tracks how many bytes were fed.
///
/// Feeding the same bytes in any chunking produces the same digest as
/// [`sha256_hex`] over the concatenation.
#[derive(Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
    total_bytes: u64,
}

impl Sha256Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.total_bytes += chunk.len() as u64;
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Consume the accumulator, returning `(hex_digest, total_bytes)`
    pub fn finalize_hex(self) -> (String, u64) {
        (hex::encode(self.hasher.finalize()), self.total_bytes)
    }
}
