use std::sync::Arc;

use tikoy_lifecycle::TikoyManager;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub manager: TikoyManager,
    /// Origin that share links are built on, e.g. `https://tikoy.example`.
    pub public_origin: String,
}
