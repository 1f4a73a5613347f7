use thiserror::Error;

/// Backend-level failure. Never crosses the [`crate::FailoverStore`] boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),

    #[error("id {0:?} is not URL-safe")]
    InvalidId(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend rejected request with status {0}")]
    Rejected(u16),

    #[error("malformed document: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Local(#[from] anyhow::Error),
}

/// Both the primary and the fallback write failed. Carries no backend detail.
#[derive(Debug, Error)]
#[error("tikoy {id} could not be persisted")]
pub struct PersistenceFailure {
    pub id: String,
}
