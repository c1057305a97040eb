use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{StratumError, StratumResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// A rendered frame as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**, tightly packed, row-major. A zeroed buffer is fully
/// transparent. The frame's own `width`/`height` is the resolution it was computed at, which is
/// what the composition checks before reusing a cached frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, premultiplied.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; pixel_bytes(width, height)],
        }
    }

    /// Frame filled with a single premultiplied colour.
    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> Self {
        let px = color.to_array();
        Self {
            width,
            height,
            data: px.repeat(pixel_count(width, height)),
        }
    }

    /// Wrap premultiplied RGBA8 bytes, validating the buffer length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> StratumResult<Self> {
        if data.len() != pixel_bytes(width, height) {
            return Err(StratumError::validation(format!(
                "rgba8 buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap straight-alpha RGBA8 bytes, premultiplying them.
    pub fn from_straight(width: u32, height: u32, mut data: Vec<u8>) -> StratumResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Copy the pixels out as straight-alpha RGBA8.
    pub fn to_straight(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// `(height, width)`, the shape a cached frame is validated against.
    pub fn shape(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Number of bytes held by the pixel buffer.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = self.data.get(idx..idx + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Fail unless `data` holds exactly `width * height` pixels.
    pub fn check_len(&self) -> StratumResult<()> {
        if self.data.len() != pixel_bytes(self.width, self.height) {
            return Err(StratumError::evaluation(format!(
                "rgba8 buffer of {} bytes does not match {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// `true` when every pixel has zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

pub(crate) fn pixel_count(width: u32, height: u32) -> usize {
    (width as usize).saturating_mul(height as usize)
}

fn pixel_bytes(width: u32, height: u32) -> usize {
    pixel_count(width, height).saturating_mul(4)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
