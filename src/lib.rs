//! Stratum is a programmatic video compositing engine.
//!
//! A [`Composition`] is an ordered stack of named [`Component`]s. Each component places a
//! [`Layer`] (anything that can produce a frame for a given time) in space and time, with a
//! blend mode and an optional alpha matte. Rendering a time composites every active component
//! in paint order, and the result is kept in a size-bounded frame cache keyed by the structure
//! of the inputs, so identical frames are composited once.
//!
//! - Build a [`Composition`] and add layers with [`Composition::add_layer`]
//! - Render single frames with [`Composition::render`], optionally inside a
//!   [`Composition::preview`] scope for reduced resolution
//! - Export a time range into a [`FrameSink`] with [`Composition::write_video`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Frame cache and cache keys.
pub mod cache;
/// Blending, transforms and placement.
pub mod compose;
/// Encoding sinks.
pub mod encode;
/// Shared value types and errors.
pub mod foundation;
/// The layer capability and built-in layers.
pub mod layer;
/// Raster frames.
pub mod render;
/// Components, compositions, preview scopes and export.
pub mod scene;

pub use crate::foundation::core::{Affine, Fps, FrameIndex, Point, Rect, Rgba8Premul, Size, Vec2};
pub use crate::foundation::error::{StratumError, StratumResult};

pub use crate::cache::frame_cache::{FrameCache, FrameCacheOpts, FrameCacheStats};
pub use crate::cache::key::{CompositeKey, ContentKey, KeyHasher, KeyPart};
pub use crate::compose::blend::BlendMode;
pub use crate::compose::transform::{Origin, Transform};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::layer::Layer;
pub use crate::layer::function::FnLayer;
pub use crate::layer::image::ImageLayer;
pub use crate::layer::solid::SolidLayer;
pub use crate::render::frame::FrameRGBA;
pub use crate::scene::component::Component;
pub use crate::scene::composition::{Composition, CompositionOpts, LayerOpts};
pub use crate::scene::export::{ExportOpts, ExportStats};
pub use crate::scene::preview::PreviewGuard;
