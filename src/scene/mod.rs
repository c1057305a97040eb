//! Components, compositions, preview scopes and export.

/// A layer placed in time and space.
pub mod component;
/// The ordered component stack and its frame cache.
pub mod composition;
/// Bulk export into a frame sink.
pub mod export;
/// Scoped preview-level overrides.
pub mod preview;
