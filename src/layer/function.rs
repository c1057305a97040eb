use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::key::{ContentKey, KeyHasher};
use crate::foundation::error::StratumResult;
use crate::layer::Layer;
use crate::render::frame::FrameRGBA;

static NEXT_FN_LAYER_ID: AtomicU64 = AtomicU64::new(1);

type RenderFn = dyn Fn(f64) -> Option<FrameRGBA> + Send + Sync;
type KeyFn = dyn Fn(f64) -> ContentKey + Send + Sync;

/// Adapts a plain closure into a [`Layer`].
///
/// The closure is opaque, so by default every distinct layer time is treated as distinct
/// content. Closures that are constant over stretches of time can declare that through
/// [`FnLayer::with_key`] to get cache hits across those stretches.
///
/// Every `FnLayer` gets a process-unique id mixed into its keys: two different closures never
/// share a cache entry even when their key functions agree.
pub struct FnLayer {
    id: u64,
    duration: f64,
    render_fn: Box<RenderFn>,
    key_fn: Option<Box<KeyFn>>,
}

impl FnLayer {
    /// Wrap `render` as a layer of the given duration.
    pub fn new<F>(duration: f64, render: F) -> Self
    where
        F: Fn(f64) -> Option<FrameRGBA> + Send + Sync + 'static,
    {
        Self {
            id: NEXT_FN_LAYER_ID.fetch_add(1, Ordering::Relaxed),
            duration,
            render_fn: Box::new(render),
            key_fn: None,
        }
    }

    /// Replace the default per-time identity with a caller-provided one.
    ///
    /// `key` must change whenever the closure's output changes.
    pub fn with_key<K>(mut self, key: K) -> Self
    where
        K: Fn(f64) -> ContentKey + Send + Sync + 'static,
    {
        self.key_fn = Some(Box::new(key));
        self
    }
}

impl Layer for FnLayer {
    fn render(&self, time: f64) -> StratumResult<Option<FrameRGBA>> {
        Ok((self.render_fn)(time))
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn content_key(&self, time: f64) -> ContentKey {
        let mut h = KeyHasher::new("fn");
        h.write_u64(self.id);
        match &self.key_fn {
            Some(key_fn) => h.write_u8(1).write_key(key_fn(time)),
            None => h.write_u8(0).write_f64(time),
        };
        h.finish()
    }
}

impl std::fmt::Debug for FnLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnLayer")
            .field("id", &self.id)
            .field("duration", &self.duration)
            .field("custom_key", &self.key_fn.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/function.rs"]
mod tests;
