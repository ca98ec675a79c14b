//! Battle Decision Engine
//!
//! Turn policy, in order:
//! - capture when asked to and the opponent is weak enough, else attack
//!   with the best-ranked usable move
//! - re-read the page; a fled opponent ends the battle for good
//! - swap out a combatant that is down or critical, flee when no reserve
//!   is left
//! - otherwise heal when low on life
//!
//! Thresholds and item preferences come from [`BattlePolicy`].
//!
//! [`BattlePolicy`]: crate::core::config::BattlePolicy

pub mod engine;
pub mod inventory;
pub mod policy;
pub mod snapshot;

pub use engine::{fight, BattleAction, BattleEngine, BattlePhase, BattleReport, FightOptions};
pub use inventory::Inventory;
pub use policy::{best_move, move_score};
pub use snapshot::{BattleSignal, BattleSnapshot};
