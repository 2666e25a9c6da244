//! Composite identity keys.
//!
//! Natural ids are only unique within one source site, so records carry a
//! composite hash of (source id, natural ids in hierarchy order). The hash is
//! a plain SHA-256 over the byte representation of the components, making it
//! stable across processes and platforms.

use crate::models::Source;
use sha2::{Digest, Sha256};

/// Hash an ordered tuple of id components for a source.
///
/// Components are fed through the hasher separated by a NUL byte, which
/// cannot appear inside a natural id, so ("1", "23") and ("12", "3") never
/// collide.
pub fn combine_hash(source: Source, components: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.id().to_string().as_bytes());
    for component in components {
        hasher.update([0u8]);
        hasher.update(component.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Composite key for a manga.
pub fn manga_hash(source: Source, manga_id: &str) -> String {
    combine_hash(source, &[manga_id])
}

/// Composite key for a chapter within a manga.
pub fn chapter_hash(source: Source, manga_id: &str, chapter_id: &str) -> String {
    combine_hash(source, &[manga_id, chapter_id])
}
