//! Origins Pilot - automation engine for the Pokemon Origins browser game
//!
//! Game state is only available as server-rendered pages. A [`Session`]
//! paces every round-trip, the [`extract`] layer turns pages into typed
//! snapshots, and the engines on top decide what to do next:
//!
//! - [`missions`]: send free combatants on open missions
//! - [`area`]: sweep a rectangle of the map for encounters
//! - [`battle`]: drive a battle to its end
//! - [`campaign`]: play scripted quests
//! - [`training`]: level combatants on a ladder of opponents
//!
//! [`Session`]: session::Session

pub mod account;
pub mod area;
pub mod battle;
pub mod campaign;
pub mod catalog;
pub mod core;
pub mod extract;
pub mod missions;
pub mod runner;
pub mod session;
pub mod training;
pub mod transport;
