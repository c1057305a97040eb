use crate::cache::key::{ContentKey, KeyHasher};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{StratumError, StratumResult};
use crate::layer::Layer;
use crate::render::frame::FrameRGBA;

/// A `width x height` rectangle of one colour.
#[derive(Clone, Debug, PartialEq)]
pub struct SolidLayer {
    width: u32,
    height: u32,
    color: Rgba8Premul,
    duration: f64,
}

impl SolidLayer {
    /// Create a solid from a straight-alpha RGBA8 colour.
    pub fn new(width: u32, height: u32, rgba: [u8; 4], duration: f64) -> StratumResult<Self> {
        if width == 0 || height == 0 {
            return Err(StratumError::validation(format!(
                "solid layer size must be positive, got {width}x{height}"
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(StratumError::validation(format!(
                "solid layer duration must be positive, got {duration}"
            )));
        }
        Ok(Self {
            width,
            height,
            color: Rgba8Premul::from_straight_rgba(rgba[0], rgba[1], rgba[2], rgba[3]),
            duration,
        })
    }

    /// Premultiplied fill colour.
    pub fn color(&self) -> Rgba8Premul {
        self.color
    }

    /// Patch size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Layer for SolidLayer {
    fn render(&self, _time: f64) -> StratumResult<Option<FrameRGBA>> {
        Ok(Some(FrameRGBA::filled(self.width, self.height, self.color)))
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        KeyHasher::new("solid")
            .write_u32(self.width)
            .write_u32(self.height)
            .write_bytes(&self.color.to_array())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/solid.rs"]
mod tests;
