use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use crate::cache::key::CompositeKey;
use crate::render::frame::FrameRGBA;

/// Frame cache configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameCacheOpts {
    /// Maximum bytes of pixel data retained across all entries.
    pub max_bytes: usize,
}

impl Default for FrameCacheOpts {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Successful insertions.
    pub inserts: u64,
    /// Entries dropped to honor the byte budget.
    pub evictions: u64,
    /// Entries removed because their resolution no longer matched.
    pub invalidations: u64,
}

/// Size-bounded, content-addressed store of composited frames.
///
/// Recency is tracked by [`LruCache`]; the byte budget is enforced here since entries differ in
/// size with the preview level.
pub struct FrameCache {
    opts: FrameCacheOpts,
    entries: LruCache<CompositeKey, Arc<FrameRGBA>>,
    retained_bytes: usize,
    stats: FrameCacheStats,
}

impl FrameCache {
    /// Create an empty cache.
    pub fn new(opts: FrameCacheOpts) -> Self {
        Self {
            opts,
            entries: LruCache::unbounded(),
            retained_bytes: 0,
            stats: FrameCacheStats::default(),
        }
    }

    /// Cache configuration.
    pub fn opts(&self) -> FrameCacheOpts {
        self.opts
    }

    /// Look up a frame and mark it most recently used.
    pub fn get(&mut self, key: &CompositeKey) -> Option<Arc<FrameRGBA>> {
        match self.entries.get(key) {
            Some(frame) => {
                self.stats.hits += 1;
                Some(Arc::clone(frame))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up a frame without touching recency or counters.
    pub fn peek(&self, key: &CompositeKey) -> Option<&Arc<FrameRGBA>> {
        self.entries.peek(key)
    }

    /// `true` when `key` has an entry.
    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.entries.contains(key)
    }

    /// Insert a frame, evicting least recently used entries until it fits.
    ///
    /// A frame larger than the whole budget is not retained.
    pub fn put(&mut self, key: CompositeKey, frame: Arc<FrameRGBA>) {
        let bytes = frame.byte_len();
        if let Some(old) = self.entries.pop(&key) {
            self.retained_bytes = self.retained_bytes.saturating_sub(old.byte_len());
        }
        if bytes > self.opts.max_bytes {
            debug!(
                bytes,
                max_bytes = self.opts.max_bytes,
                "frame exceeds cache budget, not retained"
            );
            return;
        }

        while self.retained_bytes.saturating_add(bytes) > self.opts.max_bytes {
            let Some((_, evicted)) = self.entries.pop_lru() else {
                break;
            };
            self.retained_bytes = self.retained_bytes.saturating_sub(evicted.byte_len());
            self.stats.evictions += 1;
            debug!(
                freed = evicted.byte_len(),
                retained = self.retained_bytes,
                "evicted least recently used frame"
            );
        }

        self.entries.put(key, frame);
        self.retained_bytes = self.retained_bytes.saturating_add(bytes);
        self.stats.inserts += 1;
    }

    /// Remove an entry, returning its frame.
    pub fn remove(&mut self, key: &CompositeKey) -> Option<Arc<FrameRGBA>> {
        let frame = self.entries.pop(key)?;
        self.retained_bytes = self.retained_bytes.saturating_sub(frame.byte_len());
        Some(frame)
    }

    /// Remove an entry whose resolution went stale.
    pub(crate) fn invalidate(&mut self, key: &CompositeKey) {
        if self.remove(key).is_some() {
            self.stats.invalidations += 1;
        }
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.retained_bytes = 0;
        debug!(dropped, "frame cache cleared");
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of pixel data currently retained.
    pub fn retained_bytes(&self) -> usize {
        self.retained_bytes
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> FrameCacheStats {
        self.stats
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new(FrameCacheOpts::default())
    }
}

impl std::fmt::Debug for FrameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCache")
            .field("entries", &self.entries.len())
            .field("retained_bytes", &self.retained_bytes)
            .field("max_bytes", &self.opts.max_bytes)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frame_cache.rs"]
mod tests;
