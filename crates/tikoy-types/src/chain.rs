use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainStatus {
    Active,
    Broken,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAction {
    Created,
    Passed,
    Expired,
}

/// One hop of a chain: who held the Tikoy and for how long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub holder_name: String,
    pub tikoy_id: String,
    pub received_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub action: LinkAction,
}

impl ChainLink {
    pub fn hold_ms(&self) -> Option<i64> {
        self.passed_at.map(|passed| passed - self.received_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    /// Every link after the originator counts as one pass.
    pub total_passes: u32,
    pub total_unique_people: u32,
    /// Distinct cities in first-seen order.
    pub cities_visited: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_time_per_pass_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_hold_ms: Option<i64>,
}

impl ChainStats {
    /// Recompute all statistics from the full link sequence.
    pub fn from_links(links: &[ChainLink]) -> Self {
        let mut holders: Vec<&str> = Vec::new();
        let mut cities_visited: Vec<String> = Vec::new();
        let mut holds: Vec<i64> = Vec::new();

        for link in links {
            if !holders.contains(&link.holder_name.as_str()) {
                holders.push(&link.holder_name);
            }
            if let Some(city) = &link.city {
                if !cities_visited.contains(city) {
                    cities_visited.push(city.clone());
                }
            }
            if let Some(hold) = link.hold_ms() {
                holds.push(hold);
            }
        }

        let average_time_per_pass_ms = if holds.is_empty() {
            None
        } else {
            Some(holds.iter().sum::<i64>() / holds.len() as i64)
        };

        Self {
            total_passes: links.len().saturating_sub(1) as u32,
            total_unique_people: holders.len() as u32,
            cities_visited,
            average_time_per_pass_ms,
            longest_hold_ms: holds.iter().copied().max(),
        }
    }
}

/// Append-only journey of a chain. Stats are a pure fold over `links` and are
/// recomputed on every append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainJourney {
    pub chain_id: String,
    pub status: ChainStatus,
    pub links: Vec<ChainLink>,
    pub stats: ChainStats,
}

impl ChainJourney {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            status: ChainStatus::Active,
            links: Vec::new(),
            stats: ChainStats::default(),
        }
    }

    pub fn append(&mut self, link: ChainLink) {
        if link.action == LinkAction::Expired {
            self.status = ChainStatus::Broken;
        }
        self.links.push(link);
        self.stats = ChainStats::from_links(&self.links);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
