//! Resource Allocation Loop
//!
//! Free combatants are sent on open missions until no combatant is free.
//! The board is the only source of truth: both candidate lists are read
//! from the same page after every pass, so a combatant that came back or a
//! mission that was taken by someone else is seen on the next pass.

use crate::core::config::MissionConfig;
use crate::core::error::Result;
use crate::core::types::{CombatantId, MissionId};
use crate::extract::PageExtractor;
use crate::session::{routes, Session};
use crate::transport::Transport;
use serde::Serialize;

/// Open missions and the combatants free to take them, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissionBoard {
    pub missions: Vec<MissionId>,
    pub combatants: Vec<CombatantId>,
}

impl MissionBoard {
    /// Pairs one pass will attempt, heads of both lists first
    pub fn pairs(&self) -> impl Iterator<Item = (MissionId, CombatantId)> + '_ {
        self.missions
            .iter()
            .copied()
            .zip(self.combatants.iter().copied())
    }
}

/// What one run of the allocation loop did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationReport {
    /// Pairing passes over a refreshed board
    pub passes: u32,
    /// Mission submissions issued
    pub attempts: u32,
    pub completed: u32,
    pub failed: u32,
    /// Waits for new missions while combatants were free
    pub backoffs: u32,
}

impl<T: Transport, P: PageExtractor> Session<T, P> {
    /// Read the mission board
    pub async fn mission_board(&mut self) -> Result<MissionBoard> {
        let body = self.get(routes::MISSIONS, &[]).await?;
        self.pages().mission_board(&body)
    }

    /// Send `combatant` on `mission`
    ///
    /// # Returns
    /// Whether the game reported the mission as completed
    pub async fn do_mission(&mut self, mission: MissionId, combatant: CombatantId) -> Result<bool> {
        let form = [
            ("id_liste_pokemons", combatant.to_string()),
            ("id_mission", mission.to_string()),
            ("action", "inscription".to_string()),
        ];
        let body = self.post(routes::MISSIONS, &form).await?;
        Ok(self.pages().mission_completed(&body))
    }

    /// Board read for the loop: an unreadable page is an empty board
    async fn refresh_board(&mut self) -> Result<MissionBoard> {
        match self.mission_board().await {
            Ok(board) => Ok(board),
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                tracing::warn!("Mission board unreadable, treating as empty: {}", e);
                Ok(MissionBoard::default())
            }
        }
    }
}

/// Pair free combatants with open missions until none is free
///
/// Each pass pairs the heads of both lists, `min(missions, combatants)`
/// times. A pairing is never retried within its pass, whatever its outcome.
/// When combatants are free but no mission is open, the loop waits
/// `pacing.mission_backoff` before reading the board again. The loop ends
/// when a refresh shows no free combatant (or after `max_rounds`, if set).
///
/// # Errors
/// Only a transport failure while reading the board. Failed pairings are
/// counted in the report.
pub async fn do_all_missions<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    config: &MissionConfig,
) -> Result<AllocationReport> {
    let mut report = AllocationReport::default();
    let mut board = session.refresh_board().await?;

    while !board.combatants.is_empty() {
        if let Some(max) = config.max_rounds {
            if report.passes + report.backoffs >= max {
                tracing::info!("Stopping mission loop after {} rounds", max);
                break;
            }
        }

        if board.missions.is_empty() {
            let backoff = session.pacing().mission_backoff();
            tracing::info!(
                "{} combatants free but no mission open, waiting {:?}",
                board.combatants.len(),
                backoff
            );
            report.backoffs += 1;
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
            board = session.refresh_board().await?;
            continue;
        }

        report.passes += 1;
        let pairs: Vec<_> = board.pairs().collect();
        tracing::debug!(
            "Pass {}: {} missions, {} combatants",
            report.passes,
            board.missions.len(),
            board.combatants.len()
        );

        for (mission, combatant) in pairs {
            report.attempts += 1;
            match session.do_mission(mission, combatant).await {
                Ok(true) => {
                    tracing::info!("Mission {} done with {}", mission, combatant);
                    report.completed += 1;
                }
                Ok(false) => {
                    tracing::warn!("Mission {} not done with {}", mission, combatant);
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::error!("Mission {} with {} failed: {}", mission, combatant, e);
                    report.failed += 1;
                }
            }
        }

        board = session.refresh_board().await?;
    }

    tracing::info!(
        "Missions finished: {} completed, {} failed over {} passes",
        report.completed,
        report.failed,
        report.passes
    );
    Ok(report)
}
