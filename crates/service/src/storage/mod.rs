//! Storage abstractions for service layer
//!
//! A key-value backend is an associative store addressed by hierarchical
//! string keys (`namespace/name`). Each call is independently consistent;
//! there are no cross-key transactions and no ordering across keys.

pub mod json_map_store;
pub mod memory;
pub mod pattern;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json_map_store::{JsonFileBackend, JsonMapStore};
pub use memory::InMemoryBackend;
pub use pattern::KeyPattern;

/// Opaque typed container written to the backend: a type tag plus the
/// serialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub type_url: String,
    pub value: Vec<u8>,
}

impl Envelope {
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self { type_url: type_url.into(), value }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid key pattern: {0}")]
    InvalidPattern(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Backend contract used by `CrudService`.
///
/// Absence is not an error: `get` returns `Ok(None)` for a missing key and
/// `delete` of a missing key succeeds.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn set(&self, key: &str, value: Envelope) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<Option<Envelope>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Collect every entry whose key matches `pattern` (see [`KeyPattern`]).
    async fn get_all_matching(&self, pattern: &str) -> Result<Vec<(String, Envelope)>, StoreError>;
}
