pub mod chain;
pub mod clock;
pub mod error;
pub mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TikoyError;
pub use manager::TikoyManager;
