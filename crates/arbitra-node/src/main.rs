//! arbitra-node — operator binary for an Arbitra court.
//!
//! Every invocation:
//!   1. Opens the state database under `--data-dir`
//!   2. Restores the term clock from the database
//!   3. Runs one command against the config schedule or a dispute
//!   4. Persists the clock and flushes the database

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use arbitra_config::{ConfigQuery, ConfigScheduler};
use arbitra_core::clock::{ManualClock, TermClock};
use arbitra_core::config::ConfigRecord;
use arbitra_core::governance::GovernorKey;
use arbitra_core::types::{AccountId, Balance, DisputeId, TermId};
use arbitra_dispute::{round_fees, DisputeEngine, DisputeQuery, StaticJurorRegistry};
use arbitra_genesis::{apply_genesis, GenesisParams};
use arbitra_state::db::META_CURRENT_TERM;
use arbitra_state::StateDb;

/// One token with 18 decimals.
const UNIT: Balance = 1_000_000_000_000_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "arbitra-node",
    version,
    about = "Arbitra court operator: term-indexed config and dispute rounds"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.arbitra/data")]
    data_dir: PathBuf,

    /// Minimum active balance a juror must hold (token base units).
    #[arg(long, default_value_t = 100 * UNIT)]
    min_active_balance: Balance,

    /// Total active juror balance used to size final rounds.
    #[arg(long, default_value_t = 10_000 * UNIT)]
    total_active_balance: Balance,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialise a fresh database with the genesis config.
    Init {
        /// Path to genesis params JSON. Without it a development governor
        /// (`label:governor`) and the default config are used.
        #[arg(long)]
        genesis_params: Option<PathBuf>,
    },
    /// Print the current term.
    Term,
    /// Move the term clock forward.
    Advance {
        #[arg(long)]
        to: TermId,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(subcommand)]
    Dispute(DisputeCommand),
    /// Print the event log.
    Events {
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the config in effect at a term (default: current term).
    Show {
        #[arg(long)]
        term: Option<TermId>,
    },
    /// Schedule a config change read from a JSON file.
    Schedule {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        term: TermId,
        /// Caller account: base-58 id or `label:<name>`.
        #[arg(long)]
        caller: String,
    },
    /// List changes that have not taken effect yet.
    Pending,
}

#[derive(Subcommand, Debug)]
enum DisputeCommand {
    Create {
        #[arg(long)]
        creator: String,
        #[arg(long, default_value_t = 2)]
        rulings: u8,
        #[arg(long, default_value = "")]
        metadata: String,
        #[arg(long)]
        draft_term: TermId,
    },
    Show {
        #[arg(long)]
        id: DisputeId,
    },
    Appeal {
        #[arg(long)]
        id: DisputeId,
        #[arg(long)]
        round: u32,
        #[arg(long)]
        maker: String,
        #[arg(long)]
        ruling: u8,
        #[arg(long)]
        collateral: Balance,
    },
    /// Draft the round that follows a confirmed appeal.
    DraftRound {
        #[arg(long)]
        id: DisputeId,
        #[arg(long)]
        round: u32,
        /// Defaults to the end of the previous round's confirmation window.
        #[arg(long)]
        draft_term: Option<TermId>,
    },
    Confirm {
        #[arg(long)]
        id: DisputeId,
        #[arg(long)]
        round: u32,
        #[arg(long)]
        taker: String,
        #[arg(long)]
        ruling: u8,
        #[arg(long)]
        collateral: Balance,
    },
    Settle {
        #[arg(long)]
        id: DisputeId,
        #[arg(long)]
        round: u32,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,arbitra=debug")),
        )
        .init();

    let args = Args::parse();

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = StateDb::open(&data_dir).context("opening state database")?;

    if !matches!(args.command, Command::Init { .. }) && !db.has_genesis()? {
        bail!("database at {} is not initialised; run `init` first", data_dir.display());
    }

    // ── Clock ─────────────────────────────────────────────────────────────────
    let clock = ManualClock::new(db.get_u64_meta(META_CURRENT_TERM)?.unwrap_or(0));
    let registry = StaticJurorRegistry {
        min_active_balance: args.min_active_balance,
        total_active_balance: args.total_active_balance,
    };

    match args.command {
        Command::Init { genesis_params } => {
            let params = load_or_default_genesis_params(genesis_params.as_deref())?;
            let governor = apply_genesis(&db, &params).context("applying genesis")?;
            println!("governor: {}", governor);
        }
        Command::Term => println!("{}", clock.current_term()),
        Command::Advance { to } => {
            clock.set_term(to).context("advancing term clock")?;
            db.put_meta(META_CURRENT_TERM, &to.to_be_bytes())?;
            info!(term = to, "term advanced");
            println!("{}", to);
        }
        Command::Config(cmd) => run_config(&db, &clock, cmd)?,
        Command::Dispute(cmd) => run_dispute(&db, &clock, &registry, cmd)?,
        Command::Events { since } => {
            for record in db.events_since(since)? {
                println!(
                    "{} {} {}",
                    record.seq,
                    record.event.kind(),
                    serde_json::to_string(&record.event)?
                );
            }
        }
    }

    db.flush()?;
    Ok(())
}

fn run_config(db: &StateDb, clock: &ManualClock, cmd: ConfigCommand) -> anyhow::Result<()> {
    let query = ConfigQuery::new(db);
    match cmd {
        ConfigCommand::Show { term } => {
            println!("{}", query.describe(term.unwrap_or_else(|| clock.current_term()))?);
        }
        ConfigCommand::Schedule { file, term, caller } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading config from {}", file.display()))?;
            let record: ConfigRecord =
                serde_json::from_str(&json).context("parsing config record JSON")?;
            let governor = db.governor()?.context("no governor recorded at genesis")?;
            let governance = GovernorKey(governor);
            let scheduler = ConfigScheduler::new(db, clock, &governance)?;

            let caller = parse_account(&caller)?;
            match scheduler.schedule_change(record, term, &caller) {
                Ok(_) => println!("scheduled config change for term {}", term),
                Err(e) => {
                    warn!(error = %e, term, "config change rejected");
                    return Err(e.into());
                }
            }
        }
        ConfigCommand::Pending => {
            let governor = db.governor()?.context("no governor recorded at genesis")?;
            let governance = GovernorKey(governor);
            let scheduler = ConfigScheduler::new(db, clock, &governance)?;
            match scheduler.earliest_change_term() {
                Some(earliest) => println!(
                    "notice {} terms | earliest schedulable term {}",
                    scheduler.min_notice_terms(),
                    earliest
                ),
                None => println!(
                    "notice {} terms | no term left to schedule",
                    scheduler.min_notice_terms()
                ),
            }
            for (term, _) in query.pending_changes(clock.current_term())? {
                println!("{}", query.describe(term)?);
            }
        }
    }
    Ok(())
}

fn run_dispute(
    db: &StateDb,
    clock: &ManualClock,
    registry: &StaticJurorRegistry,
    cmd: DisputeCommand,
) -> anyhow::Result<()> {
    let engine = DisputeEngine::new(db, clock, registry);
    let query = DisputeQuery::new(db);

    let result = match cmd {
        DisputeCommand::Create { creator, rulings, metadata, draft_term } => {
            let creator = parse_account(&creator)?;
            engine
                .create_dispute(&creator, rulings, metadata.as_bytes(), draft_term)
                .map(|(dispute, round)| (dispute.id, Some(round)))
        }
        DisputeCommand::Show { id } => {
            println!("{}", query.describe(id)?);
            return Ok(());
        }
        DisputeCommand::Appeal { id, round, maker, ruling, collateral } => {
            let maker = parse_account(&maker)?;
            engine.appeal(id, round, &maker, ruling, collateral).map(|_| (id, None))
        }
        DisputeCommand::DraftRound { id, round, draft_term } => {
            let draft_term = match draft_term {
                Some(term) => term,
                None => {
                    let previous = round
                        .checked_sub(1)
                        .context("round 0 is drafted with its dispute")?;
                    db.get_round(id, previous)?
                        .with_context(|| format!("round {previous} of dispute {id} not found"))?
                        .phases()
                        .confirm_end
                }
            };
            engine.create_round(id, draft_term, round).map(|r| (id, Some(r)))
        }
        DisputeCommand::Confirm { id, round, taker, ruling, collateral } => {
            let taker = parse_account(&taker)?;
            engine
                .confirm_appeal(id, round, &taker, ruling, collateral)
                .map(|_| (id, None))
        }
        DisputeCommand::Settle { id, round } => {
            engine.settle_round(id, round).map(|_| (id, None))
        }
    };

    let (id, new_round) = match result {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "dispute operation rejected");
            return Err(e.into());
        }
    };
    if let Some(round) = new_round {
        let fees = round_fees(&round)?;
        println!("round {} fees: {}", round.index, serde_json::to_string(&fees)?);
        println!(
            "round {} penalty collateral: {}",
            round.index,
            serde_json::to_string(&round.penalty)?
        );
    }
    println!("{}", query.describe(id)?);
    Ok(())
}

/// Accept either a base-58 account id or `label:<name>`, which derives a
/// deterministic development account.
fn parse_account(s: &str) -> anyhow::Result<AccountId> {
    match s.strip_prefix("label:") {
        Some(label) => Ok(AccountId::from_label(label)),
        None => AccountId::from_b58(s).with_context(|| format!("invalid account id {s}")),
    }
}

/// Load genesis parameters from a JSON file, or fall back to development
/// defaults if no path is given.
fn load_or_default_genesis_params(path: Option<&Path>) -> anyhow::Result<GenesisParams> {
    if let Some(p) = path {
        let json = std::fs::read_to_string(p)
            .with_context(|| format!("reading genesis params from {}", p.display()))?;
        return GenesisParams::from_json(&json).context("parsing genesis params JSON");
    }
    warn!("No --genesis-params provided. Using the development governor label:governor.");
    Ok(GenesisParams::new(
        &AccountId::from_label("governor"),
        ConfigRecord::default(),
    ))
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
