//! Engine error types.

use crate::matching::PatternError;
use crate::types::method::UnknownMethod;
use crate::types::origin::OriginError;

/// Errors raised while building interceptors or changing engine state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Origin(#[from] OriginError),
    #[error(transparent)]
    Method(#[from] UnknownMethod),
    #[error(transparent)]
    Path(#[from] PatternError),
    #[error("status code {0} is outside 100-599")]
    InvalidStatus(u16),
    #[error("interception is already active")]
    AlreadyActive,
}

impl EngineError {
    /// Whether the error comes from an invalid mock definition
    /// rather than from the engine state.
    pub fn is_invalid_definition(&self) -> bool {
        !matches!(self, EngineError::AlreadyActive)
    }
}
