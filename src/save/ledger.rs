//! Local JSON ledger
//!
//! A file-backed wallet used by the command-line tool in place of the remote
//! wallet service. Every confirmed transfer is appended as one entry, tagged
//! with the batch range it paid for. The ledger is the durable record of
//! which batches a game has been paid for: it refuses to credit a batch twice,
//! and a claim session resumes from it rather than from local session files.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::rewards::{ClaimRequest, RewardAccrualState, TransferReceipt, Wallet, WalletError};

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

/// One credited transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub sequence: u64,
    pub game_id: String,
    pub coins: f64,
    pub xp: u64,
    pub reason: String,
    #[serde(default)]
    pub first_batch: usize,
    #[serde(default)]
    pub batch_count: usize,
}

impl LedgerEntry {
    fn batches_end(&self) -> usize {
        self.first_batch.saturating_add(self.batch_count)
    }
}

/// Lock file held while the ledger is read and rewritten.
///
/// Covers other processes sharing the same ledger file; removed on drop.
struct FileLock {
    path: PathBuf,
    _file: File,
}

impl FileLock {
    fn acquire(ledger: &Path) -> Result<Self, WalletError> {
        let mut name = ledger.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);

        for _ in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok(Self { path, _file: file }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => thread::sleep(LOCK_RETRY_DELAY),
                Err(e) => return Err(WalletError::Storage(e.to_string())),
            }
        }
        log::warn!("Ledger lock {:?} still held; remove it if no claim is running", path);
        Err(WalletError::Storage(format!("ledger is locked: {:?}", path)))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Append-only ledger stored as a JSON array
pub struct JsonLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Result<Vec<LedgerEntry>, WalletError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|e| WalletError::Storage(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| WalletError::Storage(e.to_string()))
    }

    /// Total coins and XP credited
    pub fn balance(&self) -> Result<(f64, u64), WalletError> {
        Ok(self
            .entries()?
            .iter()
            .fold((0.0, 0), |(coins, xp), e| (coins + e.coins, xp + e.xp)))
    }

    /// Everything credited to one game, as claim progress
    pub fn credited(&self, game_id: &str) -> Result<RewardAccrualState, WalletError> {
        Ok(credited_in(&self.entries()?, game_id))
    }

    /// Claim progress to resume a game's session from.
    ///
    /// A stored session may lag behind the ledger (its save failed, or it
    /// was reset); batches the ledger already paid for stay claimed.
    pub fn resume(
        &self,
        game_id: &str,
        stored: Option<RewardAccrualState>,
    ) -> Result<RewardAccrualState, WalletError> {
        let credited = self.credited(game_id)?;
        Ok(match stored {
            Some(state) if state.claimed_batch_count >= credited.claimed_batch_count => state,
            Some(state) => {
                log::warn!(
                    "Session for {} claimed {} batch(es) but the ledger credited {}; resuming from the ledger",
                    game_id,
                    state.claimed_batch_count,
                    credited.claimed_batch_count
                );
                credited
            }
            None => credited,
        })
    }
}

fn credited_in(entries: &[LedgerEntry], game_id: &str) -> RewardAccrualState {
    entries
        .iter()
        .filter(|e| e.game_id == game_id)
        .fold(RewardAccrualState::new(), |mut state, e| {
            state.claimed_batch_count = state.claimed_batch_count.max(e.batches_end());
            state.claimed_coins += e.coins;
            state.claimed_xp = state.claimed_xp.saturating_add(e.xp);
            state
        })
}

impl Wallet for JsonLedger {
    fn transfer(&self, request: &ClaimRequest, token: &str) -> Result<TransferReceipt, WalletError> {
        if token.trim().is_empty() {
            return Err(WalletError::Rejected("User not authenticated".to_string()));
        }
        if !request.coins.is_finite() || request.coins < 0.0 {
            return Err(WalletError::Rejected(format!("invalid coin amount {}", request.coins)));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WalletError::Storage(e.to_string()))?;
        }
        let _lock = self.write_lock.lock();
        let _file_lock = FileLock::acquire(&self.path)?;

        let mut entries = self.entries()?;
        let paid_up_to = credited_in(&entries, &request.game_id).claimed_batch_count;
        if request.first_batch < paid_up_to {
            log::warn!(
                "Refusing transfer for game {}: batches {}..{} overlap {} already credited",
                request.game_id,
                request.first_batch,
                request.batches_end(),
                paid_up_to
            );
            return Err(WalletError::Rejected(format!(
                "batches before {} of game {} are already credited",
                paid_up_to, request.game_id
            )));
        }

        let sequence = entries.last().map_or(1, |e| e.sequence + 1);
        entries.push(LedgerEntry {
            sequence,
            game_id: request.game_id.clone(),
            coins: request.coins,
            xp: request.xp,
            reason: request.reason.clone(),
            first_batch: request.first_batch,
            batch_count: request.batch_count,
        });

        let json = serde_json::to_string_pretty(&entries).map_err(|e| WalletError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| WalletError::Storage(e.to_string()))?;

        log::info!("Ledger entry {} written for game {}", sequence, request.game_id);
        Ok(TransferReceipt {
            coins_transferred: request.coins,
            xp_transferred: request.xp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{GameDefinition, Task};
    use crate::progression::ProgressionPolicy;
    use crate::rewards::{ClaimError, ClaimOutcome, ClaimSession};
    use crate::RewardEngine;

    fn scratch_ledger(name: &str) -> JsonLedger {
        let path = std::env::temp_dir()
            .join(format!("goalrush-ledger-{}-{}", name, std::process::id()))
            .join("ledger.json");
        let _ = fs::remove_file(&path);
        JsonLedger::new(path)
    }

    fn request(first_batch: usize, coins: f64, xp: u64) -> ClaimRequest {
        ClaimRequest {
            game_id: "game-7".to_string(),
            coins,
            xp,
            reason: "Game session completion - Test - 1 batches claimed".to_string(),
            first_batch,
            batch_count: 1,
        }
    }

    fn three_done() -> GameDefinition {
        let goals = (1..=6)
            .map(|i| Task::new(format!("Level {}", i), 0.5).completed(i <= 3))
            .collect();
        GameDefinition::new("game-7", "Tile Quest")
            .with_goals(goals)
            .with_policy(ProgressionPolicy::legacy())
    }

    #[test]
    fn test_entries_accumulate() {
        let ledger = scratch_ledger("accumulate");
        assert!(ledger.entries().unwrap().is_empty());

        ledger.transfer(&request(0, 10.0, 50), "tok").unwrap();
        let receipt = ledger.transfer(&request(1, 15.0, 50), "tok").unwrap();
        assert_eq!(receipt.coins_transferred, 15.0);

        let entries = ledger.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].sequence, 2);
        assert_eq!(ledger.balance().unwrap(), (25.0, 100));

        let credited = ledger.credited("game-7").unwrap();
        assert_eq!(credited.claimed_batch_count, 2);
        assert_eq!(credited.claimed_xp, 100);
        assert_eq!(ledger.credited("other").unwrap(), RewardAccrualState::new());

        let _ = fs::remove_file(ledger.path());
    }

    #[test]
    fn test_rejects_unauthenticated_and_invalid() {
        let ledger = scratch_ledger("reject");
        assert!(matches!(
            ledger.transfer(&request(0, 10.0, 50), ""),
            Err(WalletError::Rejected(_))
        ));
        assert!(matches!(
            ledger.transfer(&request(0, f64::NAN, 50), "tok"),
            Err(WalletError::Rejected(_))
        ));
        assert!(ledger.entries().unwrap().is_empty());
    }

    #[test]
    fn test_refuses_batches_already_credited() {
        let ledger = scratch_ledger("overlap");
        ledger.transfer(&request(0, 10.0, 50), "tok").unwrap();

        assert!(matches!(
            ledger.transfer(&request(0, 10.0, 50), "tok"),
            Err(WalletError::Rejected(_))
        ));
        assert_eq!(ledger.entries().unwrap().len(), 1);

        let _ = fs::remove_file(ledger.path());
    }

    #[test]
    fn test_lost_session_save_does_not_credit_twice() {
        let ledger = scratch_ledger("lost-save");
        let engine = RewardEngine::default();
        let game = three_done();

        let first = ClaimSession::for_game(&game).with_token("tok");
        let outcome = engine.claim(&game, &first, &ledger).unwrap();
        assert!(matches!(outcome, ClaimOutcome::Claimed(_)));

        // The session file was never written; the next run resumes from the ledger
        let state = ledger.resume(&game.id, None).unwrap();
        assert_eq!(state.claimed_batch_count, 1);
        let second = ClaimSession::for_game(&game).with_token("tok").with_state(state);
        assert_eq!(
            engine.claim(&game, &second, &ledger).unwrap(),
            ClaimOutcome::NotReady { tasks_remaining: 3 }
        );

        // A session that ignores the ledger is refused by it
        let stale = ClaimSession::for_game(&game).with_token("tok");
        assert!(matches!(
            engine.claim(&game, &stale, &ledger),
            Err(ClaimError::Transfer(WalletError::Rejected(_)))
        ));
        assert_eq!(stale.state(), RewardAccrualState::new());

        assert_eq!(ledger.entries().unwrap().len(), 1);
        assert_eq!(ledger.balance().unwrap(), (10.0, 50));

        let _ = fs::remove_file(ledger.path());
    }

    #[test]
    fn test_resume_prefers_the_further_state() {
        let ledger = scratch_ledger("resume");
        ledger.transfer(&request(0, 10.0, 50), "tok").unwrap();

        let behind = RewardAccrualState::new();
        assert_eq!(ledger.resume("game-7", Some(behind)).unwrap().claimed_batch_count, 1);

        let ahead = RewardAccrualState {
            claimed_batch_count: 2,
            claimed_coins: 25.0,
            claimed_xp: 100,
        };
        assert_eq!(ledger.resume("game-7", Some(ahead)).unwrap(), ahead);

        let _ = fs::remove_file(ledger.path());
    }
}
