use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use crate::tikoys;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tikoys", post(tikoys::create_tikoy))
        .route("/tikoys/{id}", get(tikoys::get_tikoy))
        .route("/tikoys/{id}/pass", post(tikoys::pass_tikoy))
        .route("/tikoys/{id}/chain", get(tikoys::get_chain))
        .route("/health", get(tikoys::health))
        .with_state(state)
}
