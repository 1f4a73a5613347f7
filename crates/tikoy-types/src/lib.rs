pub mod api;
pub mod chain;
pub mod models;

pub use models::{TikoyPatch, TikoyRecord, TikoyStatus};
