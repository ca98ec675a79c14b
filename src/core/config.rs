//! Pilot configuration with documented policy constants
//!
//! All magic numbers of the automation are collected here. The thresholds
//! were chosen empirically against the live game and are not known to be
//! optimal; every one of them can be overridden from the TOML file.
//!
//! A `PilotConfig` is an explicit record handed to whoever builds a
//! session. There is no process-wide configuration.

use crate::core::error::{PilotError, Result};
use crate::core::types::{Coord, EncounterId, ItemId};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub site: SiteConfig,
    pub pacing: PacingConfig,
    pub battle: BattlePolicy,
    pub missions: MissionConfig,
    pub training: TrainingConfig,
    /// Replacement move catalog (TOML); the embedded one is used when unset
    pub catalog: Option<PathBuf>,
    /// Replacement quest scripts (TOML); the embedded ones are used when unset
    pub quests: Option<PathBuf>,
    pub accounts: Vec<AccountConfig>,
}

/// Where the game lives and how we present ourselves
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout, in seconds
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.pokemon-origins.com".into(),
            user_agent: concat!("origins-pilot/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
        }
    }
}

/// Rate limiting against the remote service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Mandatory pause after every round-trip (milliseconds)
    ///
    /// The game has no documented rate limit; one second between requests
    /// has never been throttled.
    pub request_delay_ms: u64,

    /// Pause when combatants are free but the board has no missions (seconds)
    ///
    /// New missions appear on a server-side schedule we cannot observe.
    pub mission_backoff_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            mission_backoff_secs: 60,
        }
    }
}

impl PacingConfig {
    /// No pauses at all (replays and tests)
    pub fn immediate() -> Self {
        Self {
            request_delay_ms: 0,
            mission_backoff_secs: 0,
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn mission_backoff(&self) -> Duration {
        Duration::from_secs(self.mission_backoff_secs)
    }
}

/// Thresholds and item preferences of the battle decision engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BattlePolicy {
    /// Opponent life (%) strictly below which a requested capture is tried
    pub capture_threshold: u8,

    /// Own life (%) at or below which the active combatant is swapped out,
    /// provided the opponent has more life left than we do
    pub critical_life: u8,

    /// Own life (%) strictly below which a healing item is used
    ///
    /// Only applies when the critical rule did not fire.
    pub heal_threshold: u8,

    /// Capture items, cheapest tier first
    pub capture_items: Vec<ItemId>,

    /// Healing items, weakest first
    pub heal_items: Vec<ItemId>,

    /// Upper bound on capture throws within one capture attempt
    pub max_capture_attempts: u32,

    /// Turns after which a battle that never concludes is abandoned
    pub max_turns: u32,
}

impl Default for BattlePolicy {
    fn default() -> Self {
        Self {
            capture_threshold: 30,
            critical_life: 20,
            heal_threshold: 35,
            // Poké Ball, Super Ball, Hyper Ball, Master Ball
            capture_items: vec![ItemId(1), ItemId(2), ItemId(3), ItemId(4)],
            // Potion, Super Potion, Hyper Potion, Potion Max
            heal_items: vec![ItemId(10), ItemId(11), ItemId(12), ItemId(13)],
            max_capture_attempts: 10,
            max_turns: 100,
        }
    }
}

impl BattlePolicy {
    /// Validate thresholds for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, value) in [
            ("capture_threshold", self.capture_threshold),
            ("critical_life", self.critical_life),
            ("heal_threshold", self.heal_threshold),
        ] {
            if value > 100 {
                return Err(format!("{} ({}) must be a percentage", name, value));
            }
        }

        if self.critical_life >= self.heal_threshold {
            return Err(format!(
                "critical_life ({}) should be < heal_threshold ({})",
                self.critical_life, self.heal_threshold
            ));
        }

        if self.max_turns == 0 {
            return Err("max_turns must be positive".into());
        }

        Ok(())
    }
}

/// Mission allocation loop settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Stop after this many rounds (pairing passes plus backoff waits).
    /// Unset means "until no combatant is free".
    pub max_rounds: Option<u32>,
}

/// Training ladder: which opponent to fight at which level
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Only train combatants at or above this level
    pub min_level: Option<u8>,
    /// Action points one fight costs
    pub action_point_cost: u32,
    /// Fights per combatant before moving on to the next one
    pub max_fights_per_combatant: u32,
    /// Ladder, ordered by `max_level` ascending
    pub tiers: Vec<TrainingTier>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            min_level: None,
            action_point_cost: 1,
            max_fights_per_combatant: 10,
            tiers: Vec::new(),
        }
    }
}

/// One rung of the training ladder
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingTier {
    /// Highest level this rung is meant for (inclusive)
    pub max_level: u8,
    pub target: EncounterId,
    pub at: Option<Coord>,
}

/// Credentials of one account
#[derive(Clone, Deserialize)]
pub struct AccountConfig {
    pub login: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Name of an environment variable holding the password
    #[serde(default)]
    pub password_env: Option<String>,
}

impl AccountConfig {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: Some(password.into()),
            password_env: None,
        }
    }

    /// Resolve the password, preferring the environment variable when named
    pub fn password(&self) -> Result<String> {
        if let Some(var) = &self.password_env {
            return std::env::var(var).map_err(|_| {
                PilotError::Config(format!("{} not set for account {}", var, self.login))
            });
        }
        self.password
            .clone()
            .ok_or_else(|| PilotError::Config(format!("no password for account {}", self.login)))
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_env", &self.password_env)
            .finish()
    }
}

impl PilotConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PilotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PilotConfig = toml::from_str(content)?;
        config.validate().map_err(PilotError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.battle.validate()?;

        if self.site.base_url.is_empty() {
            return Err("site.base_url must not be empty".into());
        }

        let ladder = &self.training.tiers;
        if ladder.windows(2).any(|w| w[0].max_level >= w[1].max_level) {
            return Err("training tiers must be ordered by strictly increasing max_level".into());
        }

        Ok(())
    }

    /// Find an account by login, or the first one when no login is given
    pub fn account(&self, login: Option<&str>) -> Result<&AccountConfig> {
        match login {
            Some(login) => self
                .accounts
                .iter()
                .find(|a| a.login == login)
                .ok_or_else(|| PilotError::Config(format!("unknown account {}", login))),
            None => self
                .accounts
                .first()
                .ok_or_else(|| PilotError::Config("no account configured".into())),
        }
    }
}
