//! Per-turn decision rules
//!
//! Pure functions of a battle snapshot and the configured policy. The
//! engine applies them in order: capture or attack, then switch, then heal.

use crate::battle::inventory::Inventory;
use crate::battle::snapshot::{BattleSignal, BattleSnapshot};
use crate::battle::BattlePhase;
use crate::catalog::{Move, MoveCatalog};
use crate::core::config::BattlePolicy;
use crate::core::error::{PilotError, Result};
use crate::core::types::{CombatantId, ItemId, MoveId};
use ahash::AHashSet;

/// Ranking value of a move
///
/// Only power and accuracy count; type matchups and status effects are
/// deliberately ignored.
pub fn move_score(m: &Move) -> f64 {
    f64::from(m.power) + 0.5 * f64::from(m.accuracy)
}

/// Best of the usable moves, first one wins on ties
///
/// Moves missing from the catalog rank below every known move.
pub fn best_move(usable: &[MoveId], catalog: &MoveCatalog) -> Option<MoveId> {
    let mut best: Option<(MoveId, f64)> = None;
    for &id in usable {
        let score = match catalog.get(id) {
            Some(m) => move_score(m),
            None => {
                tracing::warn!("Move {} missing from catalog", id);
                f64::NEG_INFINITY
            }
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((id, score)),
        }
    }
    best.map(|(id, _)| id)
}

/// Opponent weak enough to try a capture
pub fn should_capture(snapshot: &BattleSnapshot, policy: &BattlePolicy) -> bool {
    snapshot.opponent_life < policy.capture_threshold
}

/// Active combatant is down, or critical while the opponent is healthier
pub fn needs_switch(snapshot: &BattleSnapshot, policy: &BattlePolicy) -> bool {
    snapshot.active_fainted
        || (snapshot.life <= policy.critical_life && snapshot.opponent_life > snapshot.life)
}

/// Worth a healing item; only asked when no switch is needed
pub fn needs_heal(snapshot: &BattleSnapshot, policy: &BattlePolicy) -> bool {
    snapshot.life < policy.heal_threshold
}

/// Cheapest capture tier still in stock
pub fn capture_item(items: &Inventory, policy: &BattlePolicy) -> Option<ItemId> {
    items.first_available(&policy.capture_items)
}

/// Weakest healing tier still in stock
pub fn heal_item(items: &Inventory, policy: &BattlePolicy) -> Option<ItemId> {
    items.first_available(&policy.heal_items)
}

/// Next reserve offered by the page that has not fought in this battle
pub fn next_reserve(
    snapshot: &BattleSnapshot,
    used: &AHashSet<CombatantId>,
) -> Option<CombatantId> {
    snapshot
        .switchable
        .iter()
        .copied()
        .find(|id| !used.contains(id) && Some(*id) != snapshot.active)
}

/// Phase a fresh snapshot puts the battle in
///
/// # Errors
/// `Unrecoverable` when the opponent is gone, `Parse` when the page left
/// the battle without telling how it ended.
pub fn phase_after(snapshot: &BattleSnapshot) -> Result<BattlePhase> {
    match snapshot.signal {
        BattleSignal::TargetGone => Err(PilotError::Unrecoverable(
            "opponent is no longer there".into(),
        )),
        BattleSignal::Captured | BattleSignal::Won => Ok(BattlePhase::EndedWon),
        BattleSignal::Lost => Ok(BattlePhase::EndedLost),
        BattleSignal::OpponentFled => Ok(BattlePhase::EndedFled),
        _ if snapshot.in_battle => Ok(BattlePhase::Active),
        signal => Err(PilotError::parse(format!(
            "battle page left with {:?} and no result",
            signal
        ))),
    }
}
