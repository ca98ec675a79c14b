//! Origins Pilot - command line entry point
//!
//! Every command prints its report as JSON on stdout; logs go to stderr
//! (filter with `RUST_LOG`, default `origins_pilot=info`).

use clap::{Parser, Subcommand};
use origins_pilot::area;
use origins_pilot::battle::{self, FightOptions};
use origins_pilot::campaign::{self, QuestBook};
use origins_pilot::catalog::MoveCatalog;
use origins_pilot::core::config::PilotConfig;
use origins_pilot::core::error::{PilotError, Result};
use origins_pilot::core::types::{Coord, EncounterId};
use origins_pilot::runner::{self, Routine};
use origins_pilot::session::Session;
use origins_pilot::training;
use origins_pilot::transport::HttpTransport;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Automation for pokemon-origins.com accounts
#[derive(Parser, Debug)]
#[command(name = "origins-pilot", version)]
struct Args {
    /// Configuration file (TOML); built-in defaults when omitted
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Account login; the first configured account when omitted
    #[arg(long, short = 'a', global = true)]
    account: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bonuses, missions and status for every configured account
    Daily,
    /// Account status for every configured account
    Status,
    /// Send free combatants on missions, for every configured account
    Missions,
    /// Collect daily bonuses for every configured account
    Bonus,
    /// List encounters in a rectangle of the map
    Sweep {
        /// First corner, as x,y
        #[arg(allow_hyphen_values = true)]
        from: Coord,
        /// Opposite corner, as x,y
        #[arg(allow_hyphen_values = true)]
        to: Coord,
    },
    /// Fight one encounter
    Fight {
        target: u32,
        /// Move there first, as x,y
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Coord>,
        /// Capture instead of knocking out
        #[arg(long)]
        capture: bool,
    },
    /// Play a quest script
    Quest {
        /// Quest name; lists the available quests when omitted
        name: Option<String>,
        /// Skip failed steps instead of aborting (the last step still counts)
        #[arg(long)]
        permissive: bool,
    },
    /// Train combatants on the configured ladder
    Train,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("origins_pilot=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PilotConfig::load(path)?,
        None => PilotConfig::default(),
    };

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, mut config: PilotConfig) -> Result<()> {
    if let (Some(login), true) = (&args.account, is_routine(&args.command)) {
        config.accounts.retain(|a| &a.login == login);
    }

    match args.command {
        Command::Daily => all_accounts(config, Routine::Daily).await,
        Command::Status => all_accounts(config, Routine::Status).await,
        Command::Missions => all_accounts(config, Routine::Missions).await,
        Command::Bonus => all_accounts(config, Routine::Bonus).await,
        Command::Quest { name: None, .. } => {
            let book = quest_book(&config)?;
            print_json(&book.names().collect::<Vec<_>>())
        }
        command => one_account(&config, args.account.as_deref(), command).await,
    }
}

fn is_routine(command: &Command) -> bool {
    matches!(
        command,
        Command::Daily | Command::Status | Command::Missions | Command::Bonus
    )
}

async fn all_accounts(config: PilotConfig, routine: Routine) -> Result<()> {
    if config.accounts.is_empty() {
        return Err(PilotError::Config("no account configured".into()));
    }
    let outcomes = runner::run_accounts(Arc::new(config), routine).await;
    print_json(&outcomes)
}

async fn one_account(config: &PilotConfig, login: Option<&str>, command: Command) -> Result<()> {
    let account = config.account(login)?;
    let owned_catalog;
    let catalog = match &config.catalog {
        Some(path) => {
            owned_catalog = MoveCatalog::load(path)?;
            &owned_catalog
        }
        None => MoveCatalog::builtin()?,
    };

    let mut session = runner::http_session(config)?;
    if !session.login(&account.login, &account.password()?).await? {
        return Err(PilotError::Unrecoverable(format!(
            "login refused for {}",
            account.login
        )));
    }

    let result = play(&mut session, config, catalog, command).await;

    if let Err(e) = session.logout().await {
        tracing::warn!("Could not disconnect {}: {}", account.login, e);
    }
    result
}

async fn play(
    session: &mut Session<HttpTransport>,
    config: &PilotConfig,
    catalog: &MoveCatalog,
    command: Command,
) -> Result<()> {
    match command {
        Command::Sweep { from, to } => print_json(&area::sweep_area(session, from, to).await),
        Command::Fight {
            target,
            at,
            capture,
        } => {
            let options = if capture {
                FightOptions::capture(EncounterId(target))
            } else {
                FightOptions::kill(EncounterId(target))
            };
            let options = FightOptions { at, ..options };
            let report = battle::fight(session, catalog, &config.battle, &options).await?;
            print_json(&report)
        }
        Command::Quest {
            name: Some(name),
            permissive,
        } => {
            let book = quest_book(config)?;
            let quest = book
                .get(&name)
                .ok_or_else(|| PilotError::Config(format!("unknown quest {}", name)))?;
            let report =
                campaign::run_quest(session, catalog, &config.battle, quest, permissive).await;
            print_json(&report)
        }
        Command::Train => {
            let report =
                training::train_all(session, catalog, &config.battle, &config.training).await?;
            print_json(&report)
        }
        other => Err(PilotError::Config(format!(
            "{:?} runs on every account, not on one session",
            other
        ))),
    }
}

fn quest_book(config: &PilotConfig) -> Result<QuestBook> {
    match &config.quests {
        Some(path) => QuestBook::load(path),
        None => QuestBook::builtin(),
    }
}

fn print_json<S: Serialize>(value: &S) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
