use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::cache::key::{ContentKey, KeyHasher};
use crate::foundation::error::{StratumError, StratumResult};
use crate::layer::Layer;
use crate::render::frame::FrameRGBA;

/// A still image shown unchanged for its whole duration.
///
/// Pixels are decoded once and kept premultiplied. The content key is derived from the pixels
/// themselves, so two layers showing the same picture share cache entries.
#[derive(Clone, Debug)]
pub struct ImageLayer {
    frame: Arc<FrameRGBA>,
    duration: f64,
    key: ContentKey,
}

impl ImageLayer {
    /// Decode an image file from disk.
    pub fn open(path: impl AsRef<Path>, duration: f64) -> StratumResult<Self> {
        let path = path.as_ref();
        let img = ::image::open(path)
            .with_context(|| format!("decode image '{}'", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw(), duration)
    }

    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8], duration: f64) -> StratumResult<Self> {
        let img = ::image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw(), duration)
    }

    /// Wrap straight-alpha RGBA8 pixels.
    pub fn from_rgba8(
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        duration: f64,
    ) -> StratumResult<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(StratumError::validation(format!(
                "image layer duration must be positive, got {duration}"
            )));
        }
        let frame = FrameRGBA::from_straight(width, height, rgba)?;
        let key = KeyHasher::new("image")
            .write_u32(width)
            .write_u32(height)
            .write_bytes(&frame.data)
            .finish();
        Ok(Self {
            frame: Arc::new(frame),
            duration,
            key,
        })
    }

    /// Image size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }
}

impl Layer for ImageLayer {
    fn render(&self, _time: f64) -> StratumResult<Option<FrameRGBA>> {
        Ok(Some(self.frame.as_ref().clone()))
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        self.key
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/image.rs"]
mod tests;
