use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the entity store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The caller passed an empty identifier or an otherwise unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A commit was rejected; none of its changes were applied.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl StoreError {
    pub(crate) fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}
