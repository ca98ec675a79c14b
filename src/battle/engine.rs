//! Battle Decision Engine
//!
//! Drives one battle from engagement to a terminal phase. Every action is
//! answered by the battle page as it stands after the action; that answer
//! is the only state the next decision is based on.

use crate::battle::policy;
use crate::battle::snapshot::{BattleSignal, BattleSnapshot};
use crate::catalog::MoveCatalog;
use crate::core::config::BattlePolicy;
use crate::core::error::{PilotError, Result};
use crate::core::types::{CombatantId, Coord, EncounterId, ItemId, MoveId};
use crate::extract::{HtmlPages, PageExtractor};
use crate::session::{routes, Session};
use crate::transport::Transport;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Where a battle stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    NotInBattle,
    Active,
    /// Opponent defeated or captured
    EndedWon,
    /// Opponent ran away; no kill, no capture
    EndedFled,
    /// Lost, or we fled
    EndedLost,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::EndedWon | Self::EndedFled | Self::EndedLost)
    }
}

/// One submission of the battle form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "id", rename_all = "snake_case")]
pub enum BattleAction {
    Attack(MoveId),
    UseItem(ItemId),
    Capture(ItemId),
    Switch(CombatantId),
    Flee,
    /// Go on to the next opposing combatant
    Continue,
}

impl BattleAction {
    fn form(self) -> Vec<(&'static str, String)> {
        match self {
            Self::Attack(id) => vec![
                ("action", routes::ACTION_ATTACK.into()),
                ("attaque", id.to_string()),
            ],
            Self::UseItem(id) => vec![
                ("action", routes::ACTION_ITEM.into()),
                ("objet", id.to_string()),
            ],
            Self::Capture(id) => vec![
                ("action", routes::ACTION_CAPTURE.into()),
                ("objet", id.to_string()),
            ],
            Self::Switch(id) => vec![
                ("action", routes::ACTION_SWITCH.into()),
                ("pokemon", id.to_string()),
            ],
            Self::Flee => vec![("action", routes::ACTION_FLEE.into())],
            Self::Continue => vec![("action", routes::ACTION_CONTINUE.into())],
        }
    }
}

/// What to fight and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FightOptions {
    pub target: EncounterId,
    /// Move there before engaging
    pub at: Option<Coord>,
    /// Try to capture once the opponent is weak enough
    pub capture: bool,
    /// Keep throwing within the same turn until captured or out of items
    pub retry_until_captured: bool,
}

impl FightOptions {
    /// Fight to the kill
    pub fn kill(target: EncounterId) -> Self {
        Self {
            target,
            at: None,
            capture: false,
            retry_until_captured: false,
        }
    }

    /// Fight until the opponent can be captured, then throw until it is
    pub fn capture(target: EncounterId) -> Self {
        Self {
            target,
            at: None,
            capture: true,
            retry_until_captured: true,
        }
    }

    pub fn at(mut self, coord: Coord) -> Self {
        self.at = Some(coord);
        self
    }
}

/// Outcome of one `fight`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BattleReport {
    pub target: Option<EncounterId>,
    /// The engage page was battle-ready
    pub began: bool,
    pub outcome: BattlePhase,
    pub captured: bool,
    pub turns: u32,
    pub capture_attempts: u32,
    /// Every action submitted, in order
    pub actions: Vec<BattleAction>,
}

impl BattleReport {
    pub fn won(&self) -> bool {
        self.outcome == BattlePhase::EndedWon
    }

    pub fn switches(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, BattleAction::Switch(_)))
            .count()
    }
}

impl<T: Transport, P: PageExtractor> Session<T, P> {
    /// Engage `target` from the current position
    pub async fn engage(&mut self, target: EncounterId) -> Result<BattleSnapshot> {
        let body = self
            .get(routes::BATTLE, &[("adversaire", target.to_string())])
            .await?;
        self.pages().battle(&body)
    }

    /// Submit one battle action and read the page it answers with
    pub async fn battle_action(&mut self, action: BattleAction) -> Result<BattleSnapshot> {
        let body = self.post(routes::BATTLE, &action.form()).await?;
        self.pages().battle(&body)
    }
}

/// State machine for a single battle
pub struct BattleEngine<'a, T, P = HtmlPages> {
    session: &'a mut Session<T, P>,
    catalog: &'a MoveCatalog,
    policy: &'a BattlePolicy,
    phase: BattlePhase,
    snapshot: BattleSnapshot,
    /// Combatants that already fought in this battle
    used: AHashSet<CombatantId>,
    /// Every capture tier ran out; stop trying
    capture_exhausted: bool,
    report: BattleReport,
}

impl<'a, T: Transport, P: PageExtractor> BattleEngine<'a, T, P> {
    pub fn new(
        session: &'a mut Session<T, P>,
        catalog: &'a MoveCatalog,
        policy: &'a BattlePolicy,
    ) -> Self {
        Self {
            session,
            catalog,
            policy,
            phase: BattlePhase::NotInBattle,
            snapshot: BattleSnapshot::default(),
            used: AHashSet::new(),
            capture_exhausted: false,
            report: BattleReport::default(),
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Last battle page read
    pub fn snapshot(&self) -> &BattleSnapshot {
        &self.snapshot
    }

    /// Optionally move to `position`, then engage `target`
    ///
    /// Succeeds only when the battle page can take a move right now; a page
    /// that merely shows a combatant is a failed begin.
    ///
    /// # Errors
    /// Transport failures only. Unreadable pages and failed moves are
    /// logged and reported as `false`.
    pub async fn begin_battle(
        &mut self,
        target: EncounterId,
        position: Option<Coord>,
    ) -> Result<bool> {
        self.reset(target);

        if let Some(coord) = position {
            match self.session.go_to(coord).await {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not check arrival at {}: {}", coord, e);
                    return Ok(false);
                }
            }
        }

        let snapshot = match self.session.engage(target).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                tracing::warn!("Battle against {} did not start: {}", target, e);
                return Ok(false);
            }
        };

        if !snapshot.is_battle_ready() {
            tracing::warn!(
                "Battle against {} did not start ({:?}, {} usable moves)",
                target,
                snapshot.signal,
                snapshot.usable_moves.len()
            );
            return Ok(false);
        }

        tracing::info!(
            "Battle against {} started (life {}%, opponent {}%)",
            target,
            snapshot.life,
            snapshot.opponent_life
        );
        if let Some(active) = snapshot.active {
            self.used.insert(active);
        }
        self.snapshot = snapshot;
        self.phase = BattlePhase::Active;
        self.report.began = true;
        Ok(true)
    }

    /// Run a whole battle
    ///
    /// # Errors
    /// `Unrecoverable` when the opponent vanished, transport failures
    /// during any action. Both abort the battle.
    pub async fn fight(mut self, options: &FightOptions) -> Result<BattleReport> {
        if !self.begin_battle(options.target, options.at).await? {
            return Ok(self.report);
        }

        while self.phase == BattlePhase::Active {
            if self.report.turns >= self.policy.max_turns {
                tracing::warn!(
                    "Battle against {} still going after {} turns, fleeing",
                    options.target,
                    self.report.turns
                );
                self.flee().await?;
                break;
            }
            self.report.turns += 1;
            self.turn(options).await?;
        }

        tracing::info!(
            "Battle against {} over: {:?} after {} turns",
            options.target,
            self.phase,
            self.report.turns
        );
        self.report.outcome = self.phase;
        Ok(self.report)
    }

    async fn turn(&mut self, options: &FightOptions) -> Result<()> {
        // Capture or attack
        let capture_now = options.capture
            && !self.capture_exhausted
            && policy::should_capture(&self.snapshot, self.policy);
        let thrown = if capture_now {
            self.capture(options.retry_until_captured).await?
        } else {
            None
        };
        let after = match thrown {
            Some(snapshot) => snapshot,
            None => {
                let current = self.snapshot.clone();
                self.attack_in_battle(&current).await?
            }
        };
        if self.observe(after)? != BattlePhase::Active {
            return Ok(());
        }

        // Switch or heal
        if policy::needs_switch(&self.snapshot, self.policy) {
            self.switch().await?;
        } else if policy::needs_heal(&self.snapshot, self.policy) {
            self.heal().await?;
        }
        Ok(())
    }

    /// Submit the best usable move of `snapshot`
    ///
    /// When the answer reports one opposing combatant down with more to
    /// come, the continuation is submitted as well and its page returned.
    pub async fn attack_in_battle(&mut self, snapshot: &BattleSnapshot) -> Result<BattleSnapshot> {
        let chosen = policy::best_move(&snapshot.usable_moves, self.catalog)
            .ok_or_else(|| PilotError::Unrecoverable("no usable move".into()))?;
        tracing::info!(
            "Attacking with {} (life {}%, opponent {}%)",
            self.catalog
                .get(chosen)
                .map(|m| m.name.as_str())
                .unwrap_or("unknown move"),
            snapshot.life,
            snapshot.opponent_life
        );

        let after = self.act(BattleAction::Attack(chosen)).await?;
        if after.signal != BattleSignal::OpponentFainted {
            return Ok(after);
        }

        tracing::info!("Opposing combatant down, going on to the next one");
        self.act(BattleAction::Continue).await
    }

    /// Throw capture items, cheapest tier first
    ///
    /// Quantities are tracked locally from the page read before the first
    /// throw. Returns the page after the last throw, or `None` when no
    /// item was thrown.
    async fn capture(&mut self, retry: bool) -> Result<Option<BattleSnapshot>> {
        let mut items = self.snapshot.items.clone();
        let mut last = None;
        let mut throws = 0;

        loop {
            let Some(item) = policy::capture_item(&items, self.policy) else {
                tracing::info!("No capture item left, fighting on");
                self.capture_exhausted = true;
                return Ok(last);
            };
            if throws >= self.policy.max_capture_attempts {
                tracing::info!("Gave up capturing after {} throws", throws);
                self.capture_exhausted = true;
                return Ok(last);
            }

            throws += 1;
            self.report.capture_attempts += 1;
            tracing::info!(
                "Throwing item {} ({} left, opponent {}%)",
                item,
                items.get(item),
                self.snapshot.opponent_life
            );
            let after = self.act(BattleAction::Capture(item)).await?;
            items.consume(item);

            let broke_free = after.signal == BattleSignal::CaptureFailed
                || (after.signal == BattleSignal::None && after.in_battle);
            if !broke_free {
                return Ok(Some(after));
            }
            tracing::info!("Capture failed");
            let keep_going = retry && !policy::needs_switch(&after, self.policy);
            last = Some(after);
            if !keep_going {
                return Ok(last);
            }
        }
    }

    async fn switch(&mut self) -> Result<()> {
        let Some(reserve) = policy::next_reserve(&self.snapshot, &self.used) else {
            tracing::warn!(
                "Combatant in trouble (life {}%) and no reserve left, fleeing",
                self.snapshot.life
            );
            return self.flee().await;
        };

        tracing::info!(
            "Switching to {} (life {}%, opponent {}%)",
            reserve,
            self.snapshot.life,
            self.snapshot.opponent_life
        );
        self.used.insert(reserve);
        let after = self.act(BattleAction::Switch(reserve)).await?;
        self.observe(after)?;
        Ok(())
    }

    async fn heal(&mut self) -> Result<()> {
        let Some(item) = policy::heal_item(&self.snapshot.items, self.policy) else {
            tracing::info!("Life at {}% but no healing item", self.snapshot.life);
            return Ok(());
        };

        tracing::info!("Healing with item {} (life {}%)", item, self.snapshot.life);
        let after = self.act(BattleAction::UseItem(item)).await?;
        self.observe(after)?;
        Ok(())
    }

    /// Leave the battle; the answer carries nothing we act on
    async fn flee(&mut self) -> Result<()> {
        self.report.actions.push(BattleAction::Flee);
        self.session
            .post(routes::BATTLE, &BattleAction::Flee.form())
            .await?;
        self.phase = BattlePhase::EndedLost;
        Ok(())
    }

    async fn act(&mut self, action: BattleAction) -> Result<BattleSnapshot> {
        self.report.actions.push(action);
        self.session.battle_action(action).await
    }

    /// Adopt a fresh page and move the phase accordingly
    fn observe(&mut self, snapshot: BattleSnapshot) -> Result<BattlePhase> {
        let phase = policy::phase_after(&snapshot)?;
        match snapshot.signal {
            BattleSignal::Captured => {
                tracing::info!("Opponent captured");
                self.report.captured = true;
            }
            BattleSignal::OpponentFled => tracing::info!("Opponent fled"),
            BattleSignal::Won => tracing::info!("Battle won"),
            BattleSignal::Lost => tracing::info!("Battle lost"),
            _ => {}
        }
        self.snapshot = snapshot;
        self.phase = phase;
        Ok(phase)
    }

    fn reset(&mut self, target: EncounterId) {
        self.phase = BattlePhase::NotInBattle;
        self.snapshot = BattleSnapshot::default();
        self.used.clear();
        self.capture_exhausted = false;
        self.report = BattleReport {
            target: Some(target),
            ..BattleReport::default()
        };
    }
}

/// Fight one battle with a fresh engine
pub async fn fight<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    catalog: &MoveCatalog,
    policy: &BattlePolicy,
    options: &FightOptions,
) -> Result<BattleReport> {
    BattleEngine::new(session, catalog, policy)
        .fight(options)
        .await
}
