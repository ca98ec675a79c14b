//! Tiered training
//!
//! Every combatant with action points left is made active in turn and
//! fights the ladder opponent matching its level, until it runs out of
//! points or reaches the per-combatant fight limit. Points are re-read
//! before every fight, always from the combatant actually active: a switch
//! during a fight is undone first. A fight that costs more than what is
//! left is never started.

use crate::battle::{self, FightOptions};
use crate::catalog::MoveCatalog;
use crate::core::config::{BattlePolicy, TrainingConfig, TrainingTier};
use crate::core::error::Result;
use crate::core::types::CombatantId;
use crate::extract::PageExtractor;
use crate::session::Session;
use crate::transport::Transport;
use serde::Serialize;

/// Ladder rung for a combatant of `level`
///
/// The first rung whose `max_level` is at or above `level`. Combatants
/// above the last rung have nothing left to train against.
pub fn tier_for(tiers: &[TrainingTier], level: u8) -> Option<&TrainingTier> {
    tiers.iter().find(|tier| level <= tier.max_level)
}

/// Training results for one combatant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombatantTraining {
    pub combatant: Option<CombatantId>,
    pub fights: u32,
    pub won: u32,
    /// Why training stopped for this combatant
    pub stopped: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrainingReport {
    pub combatants: Vec<CombatantTraining>,
}

impl TrainingReport {
    pub fn fights(&self) -> u32 {
        self.combatants.iter().map(|c| c.fights).sum()
    }
}

async fn train_one<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    catalog: &MoveCatalog,
    policy: &BattlePolicy,
    plan: &TrainingConfig,
    id: CombatantId,
) -> Result<CombatantTraining> {
    let mut result = CombatantTraining {
        combatant: Some(id),
        ..CombatantTraining::default()
    };

    if !session.select_active_combatant(id).await? {
        result.stopped = "could not be made active".into();
        return Ok(result);
    }

    while result.fights < plan.max_fights_per_combatant {
        let mut snapshot = session.account_snapshot().await?;
        if snapshot.find(id).is_none() {
            result.stopped = "no longer on the account".into();
            return Ok(result);
        }
        // A switch during the last fight leaves another combatant active
        if snapshot.active.id != id {
            tracing::info!("{} replaced {} during battle", snapshot.active.id, id);
            if !session.select_active_combatant(id).await? {
                result.stopped = "replaced during battle".into();
                return Ok(result);
            }
            snapshot = session.account_snapshot().await?;
            if snapshot.active.id != id {
                result.stopped = "replaced during battle".into();
                return Ok(result);
            }
        }
        let active = &snapshot.active;
        if active.action_points < plan.action_point_cost {
            tracing::info!(
                "{} has {} action points, a fight costs {}",
                id,
                active.action_points,
                plan.action_point_cost
            );
            result.stopped = "out of action points".into();
            return Ok(result);
        }
        let Some(tier) = tier_for(&plan.tiers, active.level) else {
            tracing::info!("{} (level {}) is above the training ladder", id, active.level);
            result.stopped = "above the ladder".into();
            return Ok(result);
        };

        let options = FightOptions {
            at: tier.at,
            ..FightOptions::kill(tier.target)
        };
        let report = battle::fight(session, catalog, policy, &options).await?;
        if !report.began {
            result.stopped = "battle did not start".into();
            return Ok(result);
        }
        result.fights += 1;
        if report.won() {
            result.won += 1;
        }
    }

    result.stopped = "fight limit reached".into();
    Ok(result)
}

/// Train every eligible combatant of the account
///
/// A combatant whose training fails is logged and the next one is tried.
pub async fn train_all<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    catalog: &MoveCatalog,
    policy: &BattlePolicy,
    plan: &TrainingConfig,
) -> Result<TrainingReport> {
    let mut report = TrainingReport::default();
    if plan.tiers.is_empty() {
        tracing::warn!("No training tier configured");
        return Ok(report);
    }

    let candidates = session
        .combatants_with_available_action_points(plan.min_level)
        .await?;
    tracing::info!("{} combatants to train", candidates.len());

    for id in candidates {
        match train_one(session, catalog, policy, plan, id).await {
            Ok(result) => {
                tracing::info!(
                    "{}: {} fights, {} won ({})",
                    id,
                    result.fights,
                    result.won,
                    result.stopped
                );
                report.combatants.push(result);
            }
            Err(e) => {
                tracing::error!("Training {} failed: {}", id, e);
                report.combatants.push(CombatantTraining {
                    combatant: Some(id),
                    stopped: e.to_string(),
                    ..CombatantTraining::default()
                });
            }
        }
    }

    Ok(report)
}
