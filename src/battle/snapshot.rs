//! What one poll of the battle page tells us

use crate::battle::inventory::Inventory;
use crate::core::types::{CombatantId, LifePercent, MoveId};
use serde::{Deserialize, Serialize};

/// Result message the page reports for the last action
///
/// Listed from the most to the least decisive; the extractor reports the
/// first one present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleSignal {
    /// The opponent is not there any more (taken by someone else, despawned)
    TargetGone,
    Captured,
    Won,
    Lost,
    OpponentFled,
    /// One opposing combatant is down but the battle goes on
    OpponentFainted,
    /// The capture item was thrown but the opponent broke free
    CaptureFailed,
    #[default]
    None,
}

/// One poll of the battle page, superseded by the next poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub in_battle: bool,
    pub active: Option<CombatantId>,
    /// Usable moves of the active combatant, in page order
    pub usable_moves: Vec<MoveId>,
    pub items: Inventory,
    /// Combatants the page offers to switch in, in page order
    pub switchable: Vec<CombatantId>,
    pub life: LifePercent,
    pub opponent_life: LifePercent,
    pub active_fainted: bool,
    pub signal: BattleSignal,
}

impl BattleSnapshot {
    /// A page that can take a move right now
    pub fn is_battle_ready(&self) -> bool {
        self.in_battle && !self.usable_moves.is_empty()
    }
}
