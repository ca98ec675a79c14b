//! Account State Model
//!
//! Every read here is a remote round-trip; a snapshot is stale as soon as
//! any mutating request has been issued after it.

pub mod bonus;
pub mod snapshot;

pub use snapshot::{AccountSnapshot, Combatant, Role};

use crate::core::error::Result;
use crate::core::types::CombatantId;
use crate::extract::PageExtractor;
use crate::session::{routes, Session};
use crate::transport::Transport;

impl<T: Transport, P: PageExtractor> Session<T, P> {
    /// Read the account page
    pub async fn account_snapshot(&mut self) -> Result<AccountSnapshot> {
        let body = self.get(routes::HOME, &[]).await?;
        let snapshot = self.pages().account(&body)?;
        tracing::debug!(
            "Account: active {} (level {}, {} AP), {} reserves, {} $ / {} gold",
            snapshot.active.id,
            snapshot.active.level,
            snapshot.active.action_points,
            snapshot.reserves.len(),
            snapshot.dollars,
            snapshot.gold
        );
        Ok(snapshot)
    }

    /// Make `id` the active combatant
    ///
    /// Checked against the game: returns true only if a fresh read shows
    /// `id` as active. A page we cannot read counts as a failure.
    pub async fn select_active_combatant(&mut self, id: CombatantId) -> Result<bool> {
        self.get(routes::MAP, &[("pokemon_actif", id.to_string())])
            .await?;

        match self.account_snapshot().await {
            Ok(snapshot) if snapshot.active.id == id => {
                tracing::debug!("Combatant {} is now active", id);
                Ok(true)
            }
            Ok(snapshot) => {
                tracing::warn!(
                    "Could not make {} active ({} still is)",
                    id,
                    snapshot.active.id
                );
                Ok(false)
            }
            Err(e) if !e.is_transient() => {
                tracing::warn!("Could not confirm {} as active: {}", id, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Combatants (active first) with action points left, optionally at or
    /// above `min_level`
    pub async fn combatants_with_available_action_points(
        &mut self,
        min_level: Option<u8>,
    ) -> Result<Vec<CombatantId>> {
        let snapshot = self.account_snapshot().await?;
        Ok(snapshot.with_available_action_points(min_level))
    }

    /// Stop the map page from showing tips
    pub async fn stop_tips(&mut self) -> Result<()> {
        self.get(routes::MAP, &[("action", "end_astuces".to_string())])
            .await?;
        tracing::debug!("Map tips dismissed");
        Ok(())
    }
}
