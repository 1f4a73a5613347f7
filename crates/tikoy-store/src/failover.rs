use std::sync::Arc;

use tracing::{error, warn};

use tikoy_types::{TikoyPatch, TikoyRecord};

use crate::{PersistenceFailure, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Primary configured, fallback behind it.
    Primary,
    /// No primary credentials; everything lives in the local store.
    FallbackOnly,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::FallbackOnly => "fallback-only",
        }
    }
}

/// Tries the primary store, then the fallback. Primary failures are logged and
/// swallowed; callers only ever see success or [`PersistenceFailure`].
///
/// There is exactly one fallback attempt per call and no retry of the primary.
#[derive(Clone)]
pub struct FailoverStore {
    primary: Option<Arc<dyn Store>>,
    fallback: Arc<dyn Store>,
}

impl FailoverStore {
    pub fn new(primary: Option<Arc<dyn Store>>, fallback: Arc<dyn Store>) -> Self {
        Self { primary, fallback }
    }

    pub fn fallback_only(fallback: Arc<dyn Store>) -> Self {
        Self::new(None, fallback)
    }

    pub fn backend(&self) -> Backend {
        match self.primary {
            Some(_) => Backend::Primary,
            None => Backend::FallbackOnly,
        }
    }

    pub async fn put(&self, id: &str, record: &TikoyRecord) -> Result<(), PersistenceFailure> {
        if let Some(primary) = &self.primary {
            match primary.put(id, record).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!("{} put of {} failed, using {}: {}", primary.name(), id, self.fallback.name(), e),
            }
        }

        self.fallback.put(id, record).await.map_err(|e| {
            error!("{} put of {} failed: {}", self.fallback.name(), id, e);
            PersistenceFailure { id: id.to_string() }
        })
    }

    /// Never fails: an id that cannot be read from either store is "not found".
    pub async fn get(&self, id: &str) -> Option<TikoyRecord> {
        if let Some(primary) = &self.primary {
            match primary.get(id).await {
                Ok(Some(record)) => return Some(record),
                // Records written during an outage only exist locally.
                Ok(None) => {}
                Err(e) => warn!("{} get of {} failed, using {}: {}", primary.name(), id, self.fallback.name(), e),
            }
        }

        match self.fallback.get(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("{} get of {} failed: {}", self.fallback.name(), id, e);
                None
            }
        }
    }

    pub async fn patch(&self, id: &str, patch: &TikoyPatch) -> Result<(), PersistenceFailure> {
        if let Some(primary) = &self.primary {
            match primary.patch(id, patch).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!("{} patch of {} failed, using {}: {}", primary.name(), id, self.fallback.name(), e),
            }
        }

        self.fallback.patch(id, patch).await.map_err(|e| {
            error!("{} patch of {} failed: {}", self.fallback.name(), id, e);
            PersistenceFailure { id: id.to_string() }
        })
    }
}
