use thiserror::Error;

use crate::codec::CodecError;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ServiceError {
    /// Stable, caller-facing error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Backend(_) => "INTERNAL",
            Self::Decode(_) => "DATA_LOSS",
            Self::FailedPrecondition(_) => "FAILED_PRECONDITION",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<CodecError> for ServiceError {
    fn from(e: CodecError) -> Self {
        Self::Decode(e.to_string())
    }
}
