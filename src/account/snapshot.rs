//! Point-in-time view of the account

use crate::core::types::CombatantId;
use serde::{Deserialize, Serialize};

/// Whether a combatant is the one sent into battles and missions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Active,
    Reserve,
}

/// An owned combatant as seen on the account page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    /// 1-100
    pub level: u8,
    pub action_points: u32,
    pub role: Role,
}

impl Combatant {
    pub fn can_act(&self) -> bool {
        self.action_points > 0
    }
}

/// Immutable read of the account page
///
/// Produced fresh by every read; nothing ever mutates one. Any mutating
/// request makes it stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub active: Combatant,
    /// In page order
    pub reserves: Vec<Combatant>,
    pub dollars: u64,
    pub gold: u64,
    pub score: u64,
    pub rank: u64,
    pub owned: u32,
    pub max_owned: u32,
}

impl AccountSnapshot {
    /// Active combatant first, then reserves in page order
    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        std::iter::once(&self.active).chain(self.reserves.iter())
    }

    pub fn find(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants().find(|c| c.id == id)
    }

    /// Combatants that still have action points, optionally at or above a level
    pub fn with_available_action_points(&self, min_level: Option<u8>) -> Vec<CombatantId> {
        self.combatants()
            .filter(|c| c.can_act())
            .filter(|c| min_level.map_or(true, |min| c.level >= min))
            .map(|c| c.id)
            .collect()
    }
}
