#![cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::storage::{Envelope, KeyValueBackend, StoreError};

/// Backend whose every call fails; counts how often it was reached.
#[derive(Default)]
pub struct FailingBackend {
    calls: AtomicUsize,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StoreError::Unavailable("connection refused".into())
    }
}

#[async_trait]
impl KeyValueBackend for FailingBackend {
    async fn set(&self, _key: &str, _value: Envelope) -> Result<(), StoreError> {
        Err(self.fail())
    }

    async fn get(&self, _key: &str) -> Result<Option<Envelope>, StoreError> {
        Err(self.fail())
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(self.fail())
    }

    async fn get_all_matching(&self, _pattern: &str) -> Result<Vec<(String, Envelope)>, StoreError> {
        Err(self.fail())
    }
}
