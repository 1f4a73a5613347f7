use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use tikoy_db::Database;
use tikoy_types::{TikoyPatch, TikoyRecord};

use crate::{Store, StoreError};

/// Well-known key holding the whole id -> record mapping.
pub const FALLBACK_KEY: &str = "tikoy_data";

type TikoyMap = BTreeMap<String, TikoyRecord>;

/// Local, single-instance store. Records written here are not visible to
/// other devices or server instances.
#[derive(Clone)]
pub struct FallbackStore {
    db: Arc<Database>,
}

impl FallbackStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn decode(raw: Option<String>) -> anyhow::Result<TikoyMap> {
    match raw {
        Some(raw) => serde_json::from_str(&raw).context("corrupt fallback mapping"),
        None => Ok(TikoyMap::new()),
    }
}

#[async_trait]
impl Store for FallbackStore {
    async fn put(&self, id: &str, record: &TikoyRecord) -> Result<(), StoreError> {
        let db = self.db.clone();
        let id = id.to_string();
        let record = record.clone();

        tokio::task::spawn_blocking(move || {
            db.update_value(FALLBACK_KEY, |current| {
                let mut map = decode(current)?;
                map.insert(id, record);
                Ok(Some(serde_json::to_string(&map)?))
            })
        })
        .await??;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TikoyRecord>, StoreError> {
        let db = self.db.clone();
        let raw = tokio::task::spawn_blocking(move || db.get_value(FALLBACK_KEY)).await??;

        let mut map = decode(raw)?;
        Ok(map.remove(id))
    }

    async fn patch(&self, id: &str, patch: &TikoyPatch) -> Result<(), StoreError> {
        let db = self.db.clone();
        let key = id.to_string();
        let patch = patch.clone();

        let written = tokio::task::spawn_blocking(move || {
            db.update_value(FALLBACK_KEY, |current| {
                let mut map = decode(current)?;
                match map.get_mut(&key) {
                    Some(record) => {
                        patch.apply(record);
                        Ok(Some(serde_json::to_string(&map)?))
                    }
                    None => Ok(None),
                }
            })
        })
        .await??;

        if written.is_none() {
            debug!("Fallback: patch of unknown tikoy {} ignored", id);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
