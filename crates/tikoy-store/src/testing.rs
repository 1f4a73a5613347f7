//! `Store` doubles for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tikoy_types::{TikoyPatch, TikoyRecord};

use crate::{Store, StoreError};

/// In-memory store. Writes can be switched to fail to simulate a backend
/// that accepts reads but rejects writes.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, TikoyRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.docs.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, id: &str, record: &TikoyRecord) -> Result<(), StoreError> {
        self.check_writes()?;
        self.docs.write().await.insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TikoyRecord>, StoreError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn patch(&self, id: &str, patch: &TikoyPatch) -> Result<(), StoreError> {
        self.check_writes()?;
        match self.docs.write().await.get_mut(id) {
            Some(record) => {
                patch.apply(record);
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Backend that is unreachable: every call fails and is counted.
#[derive(Default)]
pub struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn put(&self, _id: &str, _record: &TikoyRecord) -> Result<(), StoreError> {
        self.fail()
    }

    async fn get(&self, _id: &str) -> Result<Option<TikoyRecord>, StoreError> {
        self.fail()
    }

    async fn patch(&self, _id: &str, _patch: &TikoyPatch) -> Result<(), StoreError> {
        self.fail()
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
