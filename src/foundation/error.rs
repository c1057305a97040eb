use crate::scene::component::Component;

/// Convenience result type used across stratum.
pub type StratumResult<T> = Result<T, StratumError>;

/// Top-level error taxonomy used by compositing APIs.
#[derive(thiserror::Error, Debug)]
pub enum StratumError {
    /// Invalid configuration value (size, duration, preview level, time window, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// A layer name did not resolve to a direct member of the composition.
    #[error("not found: {0}")]
    NotFound(String),

    /// A layer name is already taken inside the composition.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// `enable_alpha_matte` was called on a component that already has a matte.
    ///
    /// When the caller gave up ownership of the target it is handed back here. A composition
    /// rejects the link before moving the target, so it stays in the stack and this is `None`.
    #[error("component '{source_name}' already has an alpha matte attached")]
    MatteAlreadyLinked {
        /// Name of the component that already carries a matte.
        source_name: String,
        /// The component that could not be attached, if it was moved in.
        target: Option<Box<Component>>,
    },

    /// Errors while rendering or compositing a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StratumError {
    /// Build a [`StratumError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StratumError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`StratumError::Duplicate`] value.
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Build a [`StratumError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Recover the rejected matte target from a [`StratumError::MatteAlreadyLinked`] error.
    pub fn into_rejected_matte(self) -> Option<Component> {
        match self {
            Self::MatteAlreadyLinked { target, .. } => target.map(|t| *t),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
