pub mod config;
pub mod error;
pub mod types;

pub use config::{BattlePolicy, PacingConfig, PilotConfig};
pub use error::{PilotError, Result};
