//! Frame caching.
//!
//! Composited frames are cached under a structural key describing every component's
//! contribution. Equal keys must mean equal pixels; see [`crate::layer::Layer`] for the
//! contract layers uphold to make that true.

/// Size-bounded LRU cache of composited frames.
pub mod frame_cache;
/// Content keys and composite cache keys.
pub mod key;
