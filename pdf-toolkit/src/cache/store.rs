//! Process-wide store of rendered image sets.
//!
//! Each key owns a slot that is either being rendered (in flight) or complete.
//! At most one writer holds a key at a time: [`RenderCache::begin_write`]
//! claims the slot atomically, and readers arriving while it is in flight
//! block until the writer commits or gives up. A writer that is dropped
//! without committing releases its slot, so waiters see a miss and a later
//! caller can render again.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use super::key::CacheKey;
use crate::error::ToolkitResult;
use crate::source::RenderedImage;

/// Shared, immutable image set held by the cache
pub type CachedImages = Arc<[RenderedImage]>;

enum SlotState {
    InFlight,
    Complete(CachedImages),
    Abandoned,
}

struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Slot {
    fn in_flight() -> Self {
        Self {
            state: Mutex::new(SlotState::InFlight),
            ready: Condvar::new(),
        }
    }

    fn finish(&self, state: SlotState) {
        *self.state.lock() = state;
        self.ready.notify_all();
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone)]
pub enum Lookup {
    Hit(CachedImages),
    Miss,
}

#[derive(Default)]
pub struct RenderCache {
    slots: DashMap<CacheKey, Arc<Slot>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, waiting for an in-flight render of it to finish.
    pub fn lookup(&self, key: &CacheKey) -> Lookup {
        // Clone the slot out so no map lock is held while waiting
        let Some(slot) = self.slots.get(key).map(|entry| Arc::clone(entry.value())) else {
            return Lookup::Miss;
        };

        let mut state = slot.state.lock();
        loop {
            match &*state {
                SlotState::InFlight => slot.ready.wait(&mut state),
                SlotState::Complete(images) => return Lookup::Hit(Arc::clone(images)),
                SlotState::Abandoned => return Lookup::Miss,
            }
        }
    }

    /// Claim `key` for rendering.
    ///
    /// Returns `None` when another writer already holds the key or the entry
    /// is complete.
    pub fn begin_write(&self, key: &CacheKey) -> Option<WriteGuard<'_>> {
        let slot = Arc::new(Slot::in_flight());
        match self.slots.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if !matches!(*occupied.get().state.lock(), SlotState::Abandoned) {
                    return None;
                }
                occupied.insert(Arc::clone(&slot));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&slot));
            }
        }

        Some(WriteGuard {
            cache: self,
            key: key.clone(),
            slot,
            committed: false,
        })
    }

    /// Return the cached set for `key`, rendering it with `render` on a miss.
    ///
    /// Concurrent callers for the same key share one render. When `render`
    /// fails the error is returned and nothing is cached.
    pub fn get_or_render<F>(&self, key: &CacheKey, render: F) -> ToolkitResult<CachedImages>
    where
        F: FnOnce() -> ToolkitResult<Vec<RenderedImage>>,
    {
        let guard = loop {
            if let Lookup::Hit(images) = self.lookup(key) {
                debug!(key = %key, "Render cache hit");
                return Ok(images);
            }
            if let Some(guard) = self.begin_write(key) {
                break guard;
            }
            // Lost the race for the key; wait on the winner
        };

        debug!(key = %key, "Render cache miss");
        let images = render()?;
        Ok(guard.commit(images))
    }

    /// True when `key` has an entry, complete or in flight.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn is_complete(&self, key: &CacheKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|entry| matches!(*entry.value().state.lock(), SlotState::Complete(_)))
    }

    /// Drop the entry for `key`. An in-flight writer still hands its result to
    /// the callers already waiting on it.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.slots.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Exclusive right to fill one cache slot.
pub struct WriteGuard<'a> {
    cache: &'a RenderCache,
    key: CacheKey,
    slot: Arc<Slot>,
    committed: bool,
}

impl WriteGuard<'_> {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Publish `images` and wake every waiting reader.
    pub fn commit(mut self, images: Vec<RenderedImage>) -> CachedImages {
        let images: CachedImages = images.into();
        self.slot.finish(SlotState::Complete(Arc::clone(&images)));
        self.committed = true;
        debug!(key = %self.key, images = images.len(), "Render cache filled");
        images
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Unpublish before waking waiters so a retry finds the key free
        self.cache
            .slots
            .remove_if(&self.key, |_, slot| Arc::ptr_eq(slot, &self.slot));
        self.slot.finish(SlotState::Abandoned);
        warn!(key = %self.key, "Render abandoned, cache slot released");
    }
}
