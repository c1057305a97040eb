//! Raster frames.

/// Premultiplied RGBA8 frame buffer.
pub mod frame;
