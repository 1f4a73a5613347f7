use std::sync::Arc;

use tracing::{debug, info, warn};

use tikoy_store::FailoverStore;
use tikoy_types::chain::ChainJourney;
use tikoy_types::models::{PASS_WINDOW_MS, fresh_id};
use tikoy_types::{TikoyPatch, TikoyRecord, TikoyStatus};

use crate::chain::{journey_from_lineage, next_position};
use crate::{Clock, TikoyError};

/// Owns creation, retrieval and status transitions of Tikoy records. The only
/// writer of `status`.
///
/// Stored status only ever moves `active -> passed`. Expiry is never written:
/// callers compare `expires_at` against the clock via
/// [`TikoyRecord::effective_status`].
#[derive(Clone)]
pub struct TikoyManager {
    store: FailoverStore,
    clock: Arc<dyn Clock>,
}

impl TikoyManager {
    pub fn new(store: FailoverStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &FailoverStore {
        &self.store
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Create a record, optionally as the successor of `previous`.
    ///
    /// The new record is stored before the predecessor is marked passed, so a
    /// predecessor never reads `passed` without a successor existing in some
    /// store. If the new record cannot be stored anywhere, the predecessor is
    /// left untouched.
    pub async fn create(
        &self,
        sender_name: &str,
        message: &str,
        previous: Option<&TikoyRecord>,
    ) -> Result<TikoyRecord, TikoyError> {
        let position = next_position(previous)?;
        let now = self.clock.now_ms();

        let tikoy = TikoyRecord {
            id: fresh_id(),
            sender_name: sender_name.to_string(),
            message: message.to_string(),
            chain_id: position.chain_id,
            previous_tikoy_id: position.previous_tikoy_id,
            pass_count: position.pass_count,
            created_at: now,
            expires_at: now + PASS_WINDOW_MS,
            status: TikoyStatus::Active,
        };

        self.store.put(&tikoy.id, &tikoy).await?;

        info!(
            "Tikoy {} created (chain {}, pass #{})",
            tikoy.id, tikoy.chain_id, tikoy.pass_count
        );

        if let Some(prev) = previous {
            self.mark_passed(&prev.id).await;
        }

        Ok(tikoy)
    }

    /// Pure read. An expired record is returned as stored.
    pub async fn get(&self, id: &str) -> Option<TikoyRecord> {
        self.store.get(id).await
    }

    /// Idempotent. Unknown ids and storage failures are logged, never returned.
    pub async fn mark_passed(&self, id: &str) {
        match self.store.patch(id, &TikoyPatch::status(TikoyStatus::Passed)).await {
            Ok(()) => debug!("Tikoy {} marked passed", id),
            Err(e) => warn!("Could not mark tikoy {} passed: {}", id, e),
        }
    }

    /// Pass the record `id` forward: only a stored, unpassed, unexpired record
    /// can be passed.
    ///
    /// Two callers racing on the same predecessor can both get through; the
    /// chain then forks into two successors sharing the chain id.
    pub async fn pass(
        &self,
        id: &str,
        sender_name: &str,
        message: &str,
    ) -> Result<TikoyRecord, TikoyError> {
        let previous = self
            .store
            .get(id)
            .await
            .ok_or_else(|| TikoyError::NotFound(id.to_string()))?;

        if previous.status == TikoyStatus::Passed {
            return Err(TikoyError::AlreadyPassed(id.to_string()));
        }
        if previous.is_expired(self.clock.now_ms()) {
            return Err(TikoyError::Expired(id.to_string()));
        }

        self.create(sender_name, message, Some(&previous)).await
    }

    /// Records from the chain root up to and including `id`, ordered by pass
    /// count. Stops early at the first back-reference that cannot be resolved.
    pub async fn lineage(&self, id: &str) -> Vec<TikoyRecord> {
        let Some(start) = self.store.get(id).await else {
            return Vec::new();
        };

        let max_steps = start.pass_count as usize;
        let mut lineage = vec![start];

        while lineage.len() <= max_steps {
            let current = &lineage[lineage.len() - 1];
            let Some(prev_id) = current.previous_tikoy_id.clone() else {
                break;
            };
            let chain_id = current.chain_id.clone();

            match self.store.get(&prev_id).await {
                Some(prev) if prev.chain_id == chain_id => lineage.push(prev),
                Some(_) => {
                    warn!("Tikoy {} points outside its chain {}", prev_id, chain_id);
                    break;
                }
                None => {
                    warn!("Tikoy {} missing from chain {}", prev_id, chain_id);
                    break;
                }
            }
        }

        lineage.reverse();
        lineage
    }

    pub async fn journey(&self, id: &str) -> Option<ChainJourney> {
        let lineage = self.lineage(id).await;
        journey_from_lineage(&lineage, self.clock.now_ms())
    }
}
