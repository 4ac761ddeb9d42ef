//! Goalrush - Command-line entry point
//!
//! Evaluates game definitions, claims rewards into a local ledger, and
//! simulates play sessions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use goalrush::data::{self, DEFAULT_DATA_DIR};
use goalrush::goals::TaskStatus;
use goalrush::progression::XpTier;
use goalrush::rewards::{ClaimRequest, TransferReceipt, WalletError};
use goalrush::save::{JsonLedger, SessionStore};
use goalrush::{ClaimOutcome, ClaimSession, Evaluation, GameDefinition, RewardEngine, Wallet};

#[derive(Parser)]
#[command(name = "goalrush", version, about = "Progressive task unlocking and batch rewards")]
struct Cli {
    /// Directory holding rewards.ron
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Where session state is kept (defaults to the platform data directory)
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show unlock state and claimable rewards for a game
    Evaluate {
        game: PathBuf,
        /// Override the stored claimed-batch count
        #[arg(long)]
        claimed: Option<usize>,
        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Claim available rewards into the local ledger
    Claim {
        game: PathBuf,
        #[arg(long)]
        token: Option<String>,
        #[arg(long, default_value = "ledger.json")]
        ledger: PathBuf,
    },
    /// Play a session with random task completions
    Simulate {
        game: PathBuf,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 50)]
        steps: usize,
    },
    /// Reset the stored session for a game
    Reset { game: PathBuf },
    /// Write default configuration and a sample game
    ExportDefaults,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let engine = RewardEngine::new(data::load_engine_config(&cli.data_dir));
    let store = match &cli.session_dir {
        Some(dir) => SessionStore::new(dir),
        None => SessionStore::default_location(),
    };

    match cli.command {
        Command::Evaluate { game, claimed, json } => {
            let game = load(&game)?;
            let mut state = store.load(&game.id)?.unwrap_or_default();
            if let Some(claimed) = claimed {
                state.claimed_batch_count = claimed;
            }
            let eval = engine.evaluate(&game, &state);
            if json {
                println!("{}", serde_json::to_string_pretty(&eval)?);
            } else {
                print_report(&game, &eval);
            }
        }
        Command::Claim { game, token, ledger } => {
            let game = load(&game)?;
            let ledger = JsonLedger::new(ledger);
            let state = ledger.resume(&game.id, store.load(&game.id)?)?;
            let mut session = ClaimSession::for_game(&game).with_state(state);
            if let Some(token) = token {
                session = session.with_token(token);
            }

            let outcome = engine.claim(&game, &session, &ledger)?;
            println!("{}", outcome.message());
            if let ClaimOutcome::Claimed(_) = outcome {
                // The ledger already records the claim; the session file only caches it
                if let Err(e) = store.save(&game.id, &session.state()) {
                    log::warn!("Could not save session for {}: {}", game.id, e);
                }
                let (coins, xp) = ledger.balance()?;
                println!("Ledger balance: {:.2} coins, {} XP ({})", coins, xp, XpTier::for_xp(xp).name());
            }
        }
        Command::Simulate { game, seed, steps } => {
            let game = load(&game)?;
            simulate(&engine, game, seed, steps)?;
        }
        Command::Reset { game } => {
            let game = load(&game)?;
            if store.delete(&game.id)? {
                println!("Session for {} reset; batches already in the ledger stay credited", game.id);
            } else {
                println!("No stored session for {}", game.id);
            }
        }
        Command::ExportDefaults => {
            data::export_default_data(&cli.data_dir)?;
            println!("Default data written to {}", cli.data_dir.display());
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<GameDefinition> {
    let game = data::load_game(path).with_context(|| format!("loading {}", path.display()))?;
    if game.id.trim().is_empty() {
        bail!("game in {} has no id", path.display());
    }
    Ok(game)
}

fn print_report(game: &GameDefinition, eval: &Evaluation) {
    println!("{} [{}]", game.display_title(), game.id);
    println!();
    for task in &eval.per_task {
        let lock = if task.is_locked() { "locked" } else { "open" };
        let source = if task.decision.is_server_provided() { "*" } else { " " };
        println!(
            "{:>3}. [{:<6}]{} {:<10} {:<8} +{:<8} {:<12} {}",
            task.index + 1,
            lock,
            source,
            task.status.name(),
            task.section_label,
            task.xp_value,
            task.time_limit,
            task.title
        );
    }
    println!();

    let rewards = &eval.rewards;
    println!(
        "Session: {:.2} coins ({:.0}%), {} XP ({:.0}%) earned; game worth {} XP",
        eval.session_coins, eval.coin_progress_percent, eval.session_xp, eval.xp_progress_percent, eval.total_xp
    );
    println!(
        "Batches: {} completed, {} claimable (next batch {}/{})",
        rewards.completed_batch_count,
        rewards.available_batch_count,
        rewards.next_batch_progress,
        rewards.next_batch_target
    );
    if rewards.can_claim {
        println!(
            "Ready to claim {:.2} coins + {} XP from {} batch(es)",
            rewards.available_coins, rewards.available_xp, rewards.available_batch_count
        );
    } else if rewards.tasks_remaining() > 0 {
        println!("Complete {} more task(s) to unlock the next reward batch", rewards.tasks_remaining());
    } else {
        println!("No further reward batches can be earned");
    }
    if eval.milestone_reached {
        println!("Milestone reached");
    }
}

/// Accepts every transfer; used by simulations
struct SimulatedWallet;

impl Wallet for SimulatedWallet {
    fn transfer(&self, request: &ClaimRequest, _token: &str) -> Result<TransferReceipt, WalletError> {
        Ok(TransferReceipt {
            coins_transferred: request.coins,
            xp_transferred: request.xp,
        })
    }
}

fn simulate(engine: &RewardEngine, mut game: GameDefinition, seed: u64, steps: usize) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let session = ClaimSession::for_game(&game).with_token("simulation");

    for step in 1..=steps {
        let eval = engine.evaluate_session(&game, &session);
        if eval.can_claim() {
            let outcome = engine.claim(&game, &session, &SimulatedWallet)?;
            println!("step {:>3}: {}", step, outcome.message());
            continue;
        }

        let playable: Vec<usize> = eval
            .active()
            .filter(|t| t.status == TaskStatus::Pending)
            .map(|t| t.index)
            .collect();
        match playable.choose(&mut rng) {
            Some(&index) => {
                game.complete_goal(index);
                println!("step {:>3}: completed task {} ({})", step, index + 1, game.goals[index].title);
            }
            None => {
                println!("step {:>3}: no playable tasks left", step);
                break;
            }
        }
    }

    let state = session.state();
    println!(
        "Claimed {} batch(es): {:.2} coins, {} XP",
        state.claimed_batch_count, state.claimed_coins, state.claimed_xp
    );
    Ok(())
}
