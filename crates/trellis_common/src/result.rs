//! Common result and error types for the Trellis simulator.

/// The standard result type for operations that can only fail through a bug.
///
/// User-facing failures (bad configuration, oscillating circuits) have their
/// own error enums in the crates that produce them. `Err` here always means
/// an invariant inside Trellis was broken.
pub type TrellisResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Trellis, not a problem with the circuit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal simulator error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
