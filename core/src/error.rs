use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unsupported block type: {0}")]
    UnsupportedBlockType(String),
    #[error("no plan found: {0}")]
    NoPlanFound(String),
    #[error("block not found: {0}")]
    BlockNotFound(String),
    #[error("block {0} is not a series")]
    NotASeries(String),
    #[error("the last four blocks do not alternate")]
    NoAlternatingPattern,
    #[error("rpe must be between 1 and 10, got {0}")]
    InvalidRpe(u8),
    #[error("notes are required for free-form sessions")]
    MissingNotes,
    #[error("malformed workout: {0}")]
    Malformed(String),
}

impl CoreError {
    /// True for input errors the caller should show to the user as-is.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidRpe(_)
                | CoreError::MissingNotes
                | CoreError::UnsupportedBlockType(_)
                | CoreError::Malformed(_)
        )
    }
}
