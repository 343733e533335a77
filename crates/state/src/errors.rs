use thiserror::Error;

/// Simple result type used across the slot storage interface.
pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Clone, Error)]
pub enum StateError {
    #[error("slot store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}
