//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Owned combatant (a pokemon on the account)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "{}", _0)]
pub struct CombatantId(pub u32);

/// Mission slot offered by the mission board
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "{}", _0)]
pub struct MissionId(pub u32);

/// Entry of the static move catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "{}", _0)]
pub struct MoveId(pub u32);

/// Consumable item (capture balls, potions)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "{}", _0)]
pub struct ItemId(pub u32);

/// Wild or scripted opponent that can be engaged
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "{}", _0)]
pub struct EncounterId(pub u32);

/// Non-player character a quest talks to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "{}", _0)]
pub struct NpcId(pub u32);

/// Map coordinate (x = horizontal, y = vertical)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, Display,
)]
#[display(fmt = "({},{})", x, y)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl FromStr for Coord {
    type Err = String;

    /// Parses `"x,y"` (whitespace around either number is ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("Invalid coordinate format: {}", s))?;
        let x = x.trim().parse().map_err(|_| format!("Invalid x in {}", s))?;
        let y = y.trim().parse().map_err(|_| format!("Invalid y in {}", s))?;
        Ok(Self { x, y })
    }
}

/// Percentage of life left (0-100) as shown by the battle page
pub type LifePercent = u8;
