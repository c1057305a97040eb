//! Encoding sinks.
//!
//! Sinks consume exported frames in timeline order and are driven by
//! [`crate::Composition::write_video`].

/// `ffmpeg`-based sink (video output via the system `ffmpeg`).
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
