//! Point identifier schemes.
//!
//! With [`IdScheme::Random`] every upsert gets a fresh UUID v4, so
//! re-indexing appends duplicates next to the old records. With
//! [`IdScheme::Content`] the UUID is derived from the SHA-256 of the
//! file path, chunk index and chunk text, so re-indexing unchanged
//! content overwrites the same points.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::{Builder, Uuid};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Random,
    Content,
}

/// Identifier for chunk `chunk_index` of `file`.
pub fn point_id(scheme: IdScheme, file: &str, chunk_index: usize, content: &str) -> String {
    match scheme {
        IdScheme::Random => Uuid::new_v4().to_string(),
        IdScheme::Content => content_id(file, chunk_index, content).to_string(),
    }
}

fn content_id(file: &str, chunk_index: usize, content: &str) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(file.as_bytes());
    hasher.update([0u8]);
    hasher.update((chunk_index as u64).to_le_bytes());
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Builder::from_random_bytes(bytes).into_uuid()
}
