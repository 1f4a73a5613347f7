use thiserror::Error;

use tikoy_store::PersistenceFailure;

#[derive(Debug, Error)]
pub enum TikoyError {
    #[error(transparent)]
    Persistence(#[from] PersistenceFailure),

    #[error("tikoy {0} not found")]
    NotFound(String),

    #[error("tikoy {0} has already been passed on")]
    AlreadyPassed(String),

    #[error("tikoy {0} has expired")]
    Expired(String),

    #[error("tikoy {0} is at the maximum pass count")]
    ChainFull(String),
}
