use tikoy_types::chain::{ChainJourney, ChainLink, LinkAction};
use tikoy_types::models::fresh_id;
use tikoy_types::{TikoyRecord, TikoyStatus};

use crate::TikoyError;

/// Where a new record sits in its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPosition {
    pub chain_id: String,
    pub previous_tikoy_id: Option<String>,
    pub pass_count: u32,
}

/// A successor inherits its predecessor's chain and bumps the pass count;
/// without a predecessor a new chain starts at pass 0. A predecessor already
/// at the maximum pass count cannot be extended.
pub fn next_position(previous: Option<&TikoyRecord>) -> Result<ChainPosition, TikoyError> {
    match previous {
        Some(prev) => {
            let pass_count = prev
                .pass_count
                .checked_add(1)
                .ok_or_else(|| TikoyError::ChainFull(prev.id.clone()))?;
            Ok(ChainPosition {
                chain_id: prev.chain_id.clone(),
                previous_tikoy_id: Some(prev.id.clone()),
                pass_count,
            })
        }
        None => Ok(ChainPosition {
            chain_id: fresh_id(),
            previous_tikoy_id: None,
            pass_count: 0,
        }),
    }
}

/// Fold a root-first lineage into a journey. Each record becomes one link held
/// by its sender until the next record was created. Only a true chain root is
/// tagged `created`; a lineage cut short by a missing record starts mid-chain.
pub fn journey_from_lineage(lineage: &[TikoyRecord], now_ms: i64) -> Option<ChainJourney> {
    let first = lineage.first()?;
    let mut journey = ChainJourney::new(first.chain_id.clone());

    for (i, record) in lineage.iter().enumerate() {
        let action = if record.status != TikoyStatus::Passed && record.is_expired(now_ms) {
            LinkAction::Expired
        } else if record.is_chain_root() {
            LinkAction::Created
        } else {
            LinkAction::Passed
        };

        journey.append(ChainLink {
            holder_name: record.sender_name.clone(),
            tikoy_id: record.id.clone(),
            received_at: record.created_at,
            passed_at: lineage.get(i + 1).map(|next| next.created_at),
            city: None,
            action,
        });
    }

    Some(journey)
}
