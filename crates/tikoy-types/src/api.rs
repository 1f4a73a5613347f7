use serde::{Deserialize, Serialize};

use crate::models::{TikoyRecord, TikoyStatus};

pub const MAX_SENDER_NAME_CHARS: usize = 60;
pub const MAX_MESSAGE_CHARS: usize = 300;

// -- Tikoys --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTikoyRequest {
    pub sender_name: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PassTikoyRequest {
    pub sender_name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TikoyResponse {
    pub tikoy: TikoyRecord,
    pub effective_status: TikoyStatus,
    pub share_url: String,
    pub countdown: Countdown,
}

// -- Countdown --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// 12 hours or more left.
    Relaxed,
    /// Between 1 and 12 hours left.
    Warning,
    /// Under an hour left.
    Urgent,
    Expired,
}

/// Time left to pass a Tikoy on, derived from `expires_at` and wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub remaining_ms: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub urgency: Urgency,
}

impl Countdown {
    pub fn at(expires_at: i64, now_ms: i64) -> Self {
        let diff = expires_at - now_ms;
        if diff <= 0 {
            return Self {
                remaining_ms: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
                urgency: Urgency::Expired,
            };
        }

        let hours = diff / 3_600_000;
        let urgency = if hours < 1 {
            Urgency::Urgent
        } else if hours < 12 {
            Urgency::Warning
        } else {
            Urgency::Relaxed
        };

        Self {
            remaining_ms: diff,
            hours,
            minutes: (diff % 3_600_000) / 60_000,
            seconds: (diff % 60_000) / 1000,
            urgency,
        }
    }
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
