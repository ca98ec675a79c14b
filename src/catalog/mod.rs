//! Static move catalog
//!
//! Move statistics are scraped offline and shipped as a versioned TOML asset
//! (`data/moves.toml`). The catalog is read-only for the whole process; the
//! embedded copy is parsed once on first use.

use crate::core::error::{PilotError, Result};
use crate::core::types::MoveId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Catalog format understood by this build
pub const CATALOG_VERSION: u32 = 1;

const BUILTIN_MOVES: &str = include_str!("../../data/moves.toml");

static BUILTIN: OnceLock<MoveCatalog> = OnceLock::new();

/// How a move delivers its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveClass {
    Physical,
    Special,
    Other,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: MoveId,
    pub name: String,
    /// Elemental category as the game names it
    pub category: String,
    /// 0 for non-damaging moves
    pub power: u32,
    /// 0-100
    pub accuracy: u8,
    pub class: MoveClass,
}

#[derive(Deserialize)]
struct CatalogFile {
    version: u32,
    moves: Vec<Move>,
}

/// Lookup table of every known move
#[derive(Debug, Clone, Default)]
pub struct MoveCatalog {
    moves: AHashMap<MoveId, Move>,
}

impl MoveCatalog {
    /// The catalog embedded in the binary
    pub fn builtin() -> Result<&'static MoveCatalog> {
        if let Some(catalog) = BUILTIN.get() {
            return Ok(catalog);
        }
        let catalog = Self::from_toml_str(BUILTIN_MOVES)?;
        Ok(BUILTIN.get_or_init(|| catalog))
    }

    /// Load a replacement catalog from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PilotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        if file.version != CATALOG_VERSION {
            return Err(PilotError::Config(format!(
                "move catalog version {} (expected {})",
                file.version, CATALOG_VERSION
            )));
        }

        let mut moves = AHashMap::with_capacity(file.moves.len());
        for entry in file.moves {
            if entry.accuracy > 100 {
                return Err(PilotError::Config(format!(
                    "move {} has accuracy {}",
                    entry.id, entry.accuracy
                )));
            }
            if moves.insert(entry.id, entry).is_some() {
                return Err(PilotError::Config("duplicate move id in catalog".into()));
            }
        }
        Ok(Self { moves })
    }

    pub fn get(&self, id: MoveId) -> Option<&Move> {
        self.moves.get(&id)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl FromIterator<Move> for MoveCatalog {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().map(|m| (m.id, m)).collect(),
        }
    }
}
