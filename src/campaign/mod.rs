//! Campaign Orchestrator
//!
//! Quests are fixed scripts of steps (talk to a character, win a battle,
//! capture an opponent). Scripts are data: the built-in ones are embedded
//! from `data/quests.toml`, operators can load their own file.

use crate::battle::{self, FightOptions};
use crate::catalog::MoveCatalog;
use crate::core::config::BattlePolicy;
use crate::core::error::{PilotError, Result};
use crate::core::types::{CombatantId, Coord, EncounterId, NpcId};
use crate::extract::PageExtractor;
use crate::session::{routes, Session};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Quest file format understood by this build
pub const QUEST_FILE_VERSION: u32 = 1;

const BUILTIN_QUESTS: &str = include_str!("../../data/quests.toml");

/// One step of a quest script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Speak {
        npc: NpcId,
    },
    Fight {
        target: EncounterId,
        #[serde(default)]
        at: Option<Coord>,
    },
    /// Make `combatant` active (when given), then fight until captured
    CaptureWith {
        #[serde(default)]
        combatant: Option<CombatantId>,
        target: EncounterId,
        #[serde(default)]
        at: Option<Coord>,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Speak { npc } => write!(f, "speak to {}", npc),
            Step::Fight { target, .. } => write!(f, "fight {}", target),
            Step::CaptureWith { target, .. } => write!(f, "capture {}", target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
}

#[derive(Deserialize)]
struct QuestFile {
    version: u32,
    #[serde(default)]
    quests: Vec<Quest>,
}

/// Named quest scripts
#[derive(Debug, Clone, Default)]
pub struct QuestBook {
    quests: Vec<Quest>,
}

impl QuestBook {
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_QUESTS)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PilotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: QuestFile = toml::from_str(content)?;
        if file.version != QUEST_FILE_VERSION {
            return Err(PilotError::Config(format!(
                "quest file version {} (expected {})",
                file.version, QUEST_FILE_VERSION
            )));
        }
        if let Some(empty) = file.quests.iter().find(|q| q.steps.is_empty()) {
            return Err(PilotError::Config(format!("quest {} has no step", empty.name)));
        }
        Ok(Self {
            quests: file.quests,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.quests.iter().map(|q| q.name.as_str())
    }
}

/// How far a quest went
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestReport {
    pub quest: String,
    pub success: bool,
    /// Indices of the steps that succeeded
    pub completed: Vec<usize>,
    /// Indices of failed steps that were skipped (permissive runs only)
    pub skipped: Vec<usize>,
    /// Index of the step that ended the quest early
    pub aborted_at: Option<usize>,
}

impl<T: Transport, P: PageExtractor> Session<T, P> {
    /// Talk to a character
    ///
    /// # Returns
    /// Whether a dialogue was shown
    pub async fn speak(&mut self, npc: NpcId) -> Result<bool> {
        let body = self.get(routes::NPC, &[("id", npc.to_string())]).await?;
        let spoke = self.pages().dialogue(&body)?;
        if spoke {
            tracing::debug!("Spoke to {}", npc);
        } else {
            tracing::warn!("{} has nothing to say", npc);
        }
        Ok(spoke)
    }
}

async fn run_step<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    catalog: &MoveCatalog,
    policy: &BattlePolicy,
    step: &Step,
) -> Result<bool> {
    match step {
        Step::Speak { npc } => session.speak(*npc).await,
        Step::Fight { target, at } => {
            let options = FightOptions {
                at: *at,
                ..FightOptions::kill(*target)
            };
            let report = battle::fight(session, catalog, policy, &options).await?;
            Ok(report.won())
        }
        Step::CaptureWith {
            combatant,
            target,
            at,
        } => {
            if let Some(id) = combatant {
                if !session.select_active_combatant(*id).await? {
                    return Ok(false);
                }
            }
            let options = FightOptions {
                at: *at,
                ..FightOptions::capture(*target)
            };
            let report = battle::fight(session, catalog, policy, &options).await?;
            Ok(report.captured)
        }
    }
}

/// Play a quest script
///
/// A failed step ends the quest unless `permissive` is set, in which case
/// it is logged and skipped. The last step always ends the quest when it
/// fails. Errors from a step count as a failure of that step.
pub async fn run_quest<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    catalog: &MoveCatalog,
    policy: &BattlePolicy,
    quest: &Quest,
    permissive: bool,
) -> QuestReport {
    let mut report = QuestReport {
        quest: quest.name.clone(),
        ..QuestReport::default()
    };
    tracing::info!("Quest {}: {} steps", quest.name, quest.steps.len());

    let last = quest.steps.len().saturating_sub(1);
    for (index, step) in quest.steps.iter().enumerate() {
        let done = match run_step(session, catalog, policy, step).await {
            Ok(done) => done,
            Err(e) => {
                tracing::error!("Quest {} step {} ({}): {}", quest.name, index, step, e);
                false
            }
        };

        if done {
            tracing::info!("Quest {} step {} ({}) done", quest.name, index, step);
            report.completed.push(index);
        } else if permissive && index != last {
            tracing::warn!("Quest {} step {} ({}) failed, skipping", quest.name, index, step);
            report.skipped.push(index);
        } else {
            tracing::warn!("Quest {} aborted at step {} ({})", quest.name, index, step);
            report.aborted_at = Some(index);
            return report;
        }
    }

    report.success = !quest.steps.is_empty();
    tracing::info!(
        "Quest {} finished ({} skipped)",
        quest.name,
        report.skipped.len()
    );
    report
}
