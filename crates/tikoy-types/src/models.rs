use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed pass window: every Tikoy must be passed on within 24 hours.
pub const PASS_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Collection (document store) / table name that holds Tikoy records.
pub const COLLECTION: &str = "tikoys";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TikoyStatus {
    Active,
    Passed,
    Expired,
}

/// The single persisted entity. Serialized as a flat document with the
/// camelCase field names shared by the primary and fallback stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikoyRecord {
    pub id: String,
    pub sender_name: String,
    pub message: String,
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_tikoy_id: Option<String>,
    pub pass_count: u32,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds, always `created_at + PASS_WINDOW_MS`.
    pub expires_at: i64,
    pub status: TikoyStatus,
}

impl TikoyRecord {
    /// Expiry is computed at read time and never written back, so the stored
    /// status can read `active` for a record that is already past its window.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.status == TikoyStatus::Expired || now_ms > self.expires_at
    }

    /// Status a consumer should act on. Expiry wins over the stored status,
    /// including `passed`, once the window has closed.
    pub fn effective_status(&self, now_ms: i64) -> TikoyStatus {
        if self.is_expired(now_ms) {
            TikoyStatus::Expired
        } else {
            self.status
        }
    }

    pub fn is_chain_root(&self) -> bool {
        self.previous_tikoy_id.is_none()
    }
}

/// Partial update merged into an existing record. Only `status` is ever
/// patched today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikoyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TikoyStatus>,
}

impl TikoyPatch {
    pub fn status(status: TikoyStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn apply(&self, record: &mut TikoyRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
    }
}

/// Fresh identifier for records and chains. Hyphenated UUIDs are URL-safe,
/// so the id doubles as the share-link token.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Public share link for a record: `{origin}/tikoy/{id}`.
pub fn share_url(origin: &str, id: &str) -> String {
    format!("{}/tikoy/{}", origin.trim_end_matches('/'), id)
}
