//! Cache key derivation.
//!
//! A key is a document fingerprint plus the render variant plus a page scope.
//! The fingerprint comes from the first configured [`KeyStrategy`] that yields
//! a value for the source; a source no strategy can fingerprint is keyless and
//! is never cached.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::source::PdfSource;

/// Ways to fingerprint a source document, tried in the configured order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// The digest supplied by the host, or a SHA-256 of the bytes when hashing is enabled
    ContentDigest,
    /// The host's storage identifier
    StorageKey,
    /// `"{filename}-{byte length}"`. Weak: distinct documents can collide.
    FilenameAndLength,
}

/// Which part of a document a cache entry covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// Every page (thumbnail sets)
    AllPages,
    /// A single 1-based page (previews)
    Page(usize),
}

impl CacheScope {
    /// Key suffix. Page numbers start at 1, so `0` never names a single page.
    fn suffix(self) -> usize {
        match self {
            CacheScope::AllPages => 0,
            CacheScope::Page(page) => page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fingerprint: String,
    variant: String,
    scope: CacheScope,
}

impl CacheKey {
    pub fn new(fingerprint: impl Into<String>, variant: impl Into<String>, scope: CacheScope) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            variant: variant.into(),
            scope,
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn scope(&self) -> CacheScope {
        self.scope
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            self.fingerprint,
            self.variant,
            self.scope.suffix()
        )
    }
}

/// Derives cache keys from source metadata.
#[derive(Debug, Clone)]
pub struct CacheKeyDeriver {
    strategies: Vec<KeyStrategy>,
    hash_content: bool,
}

impl Default for CacheKeyDeriver {
    fn default() -> Self {
        Self::new(
            vec![
                KeyStrategy::ContentDigest,
                KeyStrategy::StorageKey,
                KeyStrategy::FilenameAndLength,
            ],
            true,
        )
    }
}

impl CacheKeyDeriver {
    pub fn new(strategies: Vec<KeyStrategy>, hash_content: bool) -> Self {
        Self {
            strategies,
            hash_content,
        }
    }

    /// Fingerprint of `source` from the first strategy that applies.
    pub fn fingerprint(&self, source: &PdfSource) -> Option<String> {
        self.strategies
            .iter()
            .find_map(|strategy| self.apply(*strategy, source))
    }

    pub fn derive(&self, source: &PdfSource, variant: &str, scope: CacheScope) -> Option<CacheKey> {
        self.fingerprint(source)
            .map(|fingerprint| CacheKey::new(fingerprint, variant, scope))
    }

    pub fn is_keyless(&self, source: &PdfSource) -> bool {
        self.fingerprint(source).is_none()
    }

    fn apply(&self, strategy: KeyStrategy, source: &PdfSource) -> Option<String> {
        match strategy {
            KeyStrategy::ContentDigest => source.digest().map(str::to_string).or_else(|| {
                (self.hash_content && !source.is_empty())
                    .then(|| compute_content_hash(source.bytes()))
            }),
            KeyStrategy::StorageKey => source.storage_key().map(str::to_string),
            KeyStrategy::FilenameAndLength => source
                .filename()
                .map(|name| format!("{}-{}", name, source.len())),
        }
    }
}

/// Compute SHA-256 hash of a byte slice, returning a hex string.
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
