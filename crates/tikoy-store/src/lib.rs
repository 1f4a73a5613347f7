//! Persistence adapter for Tikoy records.
//!
//! A durable, shareable [`PrimaryStore`] is tried first; any failure degrades
//! silently to the local [`FallbackStore`]. [`FailoverStore`] composes the two
//! and is the only type the lifecycle layer talks to.

pub mod error;
pub mod failover;
pub mod fallback;
pub mod primary;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use async_trait::async_trait;
use tikoy_types::{TikoyPatch, TikoyRecord};

pub use error::{PersistenceFailure, StoreError};
pub use failover::{Backend, FailoverStore};
pub use fallback::{FALLBACK_KEY, FallbackStore};
pub use primary::{PrimaryConfig, PrimaryStore};

/// A keyed document store for Tikoy records.
#[async_trait]
pub trait Store: Send + Sync {
    /// Store or overwrite the full record under `id`. Last write wins.
    async fn put(&self, id: &str, record: &TikoyRecord) -> Result<(), StoreError>;

    /// `Ok(None)` when the id is absent.
    async fn get(&self, id: &str) -> Result<Option<TikoyRecord>, StoreError>;

    /// Merge `patch` into the stored record.
    async fn patch(&self, id: &str, patch: &TikoyPatch) -> Result<(), StoreError>;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}
