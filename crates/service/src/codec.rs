//! Conversion between typed entity values and backend envelopes.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::storage::Envelope;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("expected type {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Capability of a value type to travel through a key-value backend.
pub trait EntityCodec: Sized {
    fn type_url() -> &'static str;
    fn encode(&self) -> Result<Envelope, CodecError>;
    fn decode(envelope: &Envelope) -> Result<Self, CodecError>;
}

/// A serde entity stored as JSON under a fixed type tag.
///
/// `Default` is the value written by `create`.
pub trait Entity: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    const TYPE_URL: &'static str;
    /// Human-readable label used in logs and error messages.
    const LABEL: &'static str;
}

impl<T: Entity> EntityCodec for T {
    fn type_url() -> &'static str {
        T::TYPE_URL
    }

    fn encode(&self) -> Result<Envelope, CodecError> {
        let value = serde_json::to_vec(self).map_err(|e| CodecError::Payload(e.to_string()))?;
        Ok(Envelope::new(T::TYPE_URL, value))
    }

    fn decode(envelope: &Envelope) -> Result<Self, CodecError> {
        if envelope.type_url != T::TYPE_URL {
            return Err(CodecError::TypeMismatch {
                expected: T::TYPE_URL.to_string(),
                found: envelope.type_url.clone(),
            });
        }
        serde_json::from_slice(&envelope.value).map_err(|e| CodecError::Payload(e.to_string()))
    }
}
