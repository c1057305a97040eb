//! Shared value types, the error taxonomy and pixel math helpers.

/// Frame indices, sizes, frame rates and colours.
pub mod core;
/// `StratumError` and `StratumResult`.
pub mod error;
pub(crate) mod math;
