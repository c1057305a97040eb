//! Pixel-level compositing: blend modes, alpha mattes, transforms and patch placement.

/// Blend modes and alpha-matte math on premultiplied buffers.
pub mod blend;
pub(crate) mod place;
/// Transform parameters and origin anchors.
pub mod transform;
