//! Render cache: key derivation plus a concurrent single-flight store.

mod key;
mod store;

pub use key::{CacheKey, CacheKeyDeriver, CacheScope, KeyStrategy, compute_content_hash};
pub use store::{CachedImages, Lookup, RenderCache, WriteGuard};
