//! Multi-account runner
//!
//! Each configured account gets its own transport, cookie jar and session,
//! driven by its own tokio task. Tasks share only read-only configuration.

use crate::account::AccountSnapshot;
use crate::core::config::{AccountConfig, MissionConfig, PilotConfig};
use crate::core::error::{PilotError, Result};
use crate::extract::{HtmlPages, PageExtractor};
use crate::missions::{self, AllocationReport};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;

/// What to do with every account between login and logout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Routine {
    /// Bonuses, then missions, then a status read
    Daily,
    Bonus,
    Missions,
    Status,
}

impl Routine {
    fn bonuses(self) -> bool {
        matches!(self, Self::Daily | Self::Bonus)
    }

    fn missions(self) -> bool {
        matches!(self, Self::Daily | Self::Missions)
    }

    fn status(self) -> bool {
        matches!(self, Self::Daily | Self::Status)
    }
}

/// Result of one routine on one account
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountOutcome {
    pub login: String,
    pub connected: bool,
    pub bonuses: Vec<String>,
    pub missions: Option<AllocationReport>,
    pub snapshot: Option<AccountSnapshot>,
    pub disconnected: bool,
    /// First error that stopped the routine
    pub error: Option<String>,
}

impl AccountOutcome {
    fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            ..Self::default()
        }
    }
}

async fn routine_steps<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    routine: Routine,
    missions_config: &MissionConfig,
    outcome: &mut AccountOutcome,
) -> Result<()> {
    if routine.bonuses() {
        let collected = session.collect_bonuses().await?;
        outcome.bonuses = collected.into_iter().map(String::from).collect();
    }
    if routine.missions() {
        outcome.missions = Some(missions::do_all_missions(session, missions_config).await?);
    }
    if routine.status() {
        outcome.snapshot = Some(session.account_snapshot().await?);
    }
    Ok(())
}

/// Log in, run `routine`, log out
///
/// Never fails: errors end the routine early and are recorded in the
/// outcome. Logout is attempted whenever login succeeded.
pub async fn run_routine<T: Transport, P: PageExtractor>(
    session: &mut Session<T, P>,
    account: &AccountConfig,
    routine: Routine,
    missions_config: &MissionConfig,
) -> AccountOutcome {
    let mut outcome = AccountOutcome::new(&account.login);

    let connected = match account.password() {
        Ok(password) => session.login(&account.login, &password).await,
        Err(e) => Err(e),
    };
    match connected {
        Ok(true) => outcome.connected = true,
        Ok(false) => {
            let e = PilotError::Unrecoverable(format!("login refused for {}", account.login));
            tracing::error!("{}", e);
            outcome.error = Some(e.to_string());
            return outcome;
        }
        Err(e) => {
            tracing::error!("Could not connect {}: {}", account.login, e);
            outcome.error = Some(e.to_string());
            return outcome;
        }
    }

    if let Err(e) = routine_steps(session, routine, missions_config, &mut outcome).await {
        tracing::error!("{} stopped early: {}", account.login, e);
        outcome.error = Some(e.to_string());
    }

    match session.logout().await {
        Ok(done) => outcome.disconnected = done,
        Err(e) => tracing::warn!("Could not disconnect {}: {}", account.login, e),
    }

    tracing::info!(
        "{}: {:?} done after {} requests",
        account.login,
        routine,
        session.requests()
    );
    outcome
}

/// Open an HTTP session for one account
pub fn http_session(config: &PilotConfig) -> Result<Session<HttpTransport>> {
    let transport = HttpTransport::new(&config.site)?;
    Ok(Session::new(
        transport,
        HtmlPages::new(),
        config.pacing.clone(),
    ))
}

/// Run `routine` on every configured account, one task per account
///
/// Outcomes are returned in configuration order.
pub async fn run_accounts(config: Arc<PilotConfig>, routine: Routine) -> Vec<AccountOutcome> {
    let mut tasks = JoinSet::new();

    for (index, account) in config.accounts.iter().enumerate() {
        let config = Arc::clone(&config);
        let account = account.clone();
        tasks.spawn(async move {
            let outcome = match http_session(&config) {
                Ok(mut session) => {
                    run_routine(&mut session, &account, routine, &config.missions).await
                }
                Err(e) => AccountOutcome {
                    error: Some(e.to_string()),
                    ..AccountOutcome::new(&account.login)
                },
            };
            (index, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(config.accounts.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(done) => outcomes.push(done),
            Err(e) => tracing::error!("Account task crashed: {}", e),
        }
    }
    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}
