//! The layer capability and the built-in layers.
//!
//! A [`Layer`] produces pixels for a layer-local time. The compositor never looks inside a
//! layer: it only asks for a frame, a duration, and a content key.

use crate::cache::key::ContentKey;
use crate::foundation::error::StratumResult;
use crate::render::frame::FrameRGBA;

/// Closure-backed layers.
pub mod function;
/// Still images decoded with the `image` crate.
pub mod image;
/// Constant-colour rectangles.
pub mod solid;

/// Content-producing unit wrapped by a [`crate::Component`].
///
/// # Cache contract
///
/// [`Layer::content_key`] must be deterministic and exhaustive: whenever the frame returned by
/// [`Layer::render`] for `time` would differ, the key for `time` must differ too. The frame
/// cache trusts this key completely; a key that misses a pixel-affecting parameter makes the
/// composition silently return stale frames, with no error raised anywhere.
pub trait Layer: Send + Sync {
    /// Render the layer at layer-local `time`.
    ///
    /// `Ok(None)` means the layer has nothing to draw at this time. Frames are premultiplied.
    fn render(&self, time: f64) -> StratumResult<Option<FrameRGBA>>;

    /// Nominal length of the layer in seconds.
    fn duration(&self) -> f64;

    /// Identity of the pixels produced at `time`.
    fn content_key(&self, time: f64) -> ContentKey;
}

impl<L: Layer + ?Sized> Layer for Box<L> {
    fn render(&self, time: f64) -> StratumResult<Option<FrameRGBA>> {
        (**self).render(time)
    }

    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn content_key(&self, time: f64) -> ContentKey {
        (**self).content_key(time)
    }
}
