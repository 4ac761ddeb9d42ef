//! Reward claiming
//!
//! A claim transfers the currently available batch rewards to the wallet
//! service and, once the transfer is confirmed, advances the session's
//! claimed-batch counter. At most one claim per session is ever in flight.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::batch::{calculate_batch_rewards, BatchRewards, RewardSchedule};
use crate::goals::GameDefinition;
use crate::progression::ProgressionPolicy;

/// Claim progress for one game session, held by the caller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardAccrualState {
    /// Batches already claimed; never decreases within a session
    pub claimed_batch_count: usize,
    /// Coins transferred this session (display only)
    pub claimed_coins: f64,
    /// XP transferred this session (display only)
    pub claimed_xp: u64,
}

impl RewardAccrualState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed transfer
    pub fn record_claim(&mut self, batches: usize, coins: f64, xp: u64) {
        self.claimed_batch_count = self.claimed_batch_count.saturating_add(batches);
        self.claimed_coins += coins;
        self.claimed_xp = self.claimed_xp.saturating_add(xp);
    }
}

/// Credit request sent to the wallet service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub game_id: String,
    pub coins: f64,
    pub xp: u64,
    pub reason: String,
    /// Index of the first batch being paid for
    pub first_batch: usize,
    pub batch_count: usize,
}

impl ClaimRequest {
    /// Batch count the game reaches once this request is credited
    pub fn batches_end(&self) -> usize {
        self.first_batch.saturating_add(self.batch_count)
    }
}

/// Amounts the wallet reports as credited
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub coins_transferred: f64,
    pub xp_transferred: u64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Wallet unreachable: {0}")]
    Network(String),

    #[error("Transfer rejected: {0}")]
    Rejected(String),

    #[error("Ledger storage error: {0}")]
    Storage(String),
}

/// Durable store of transferred value
///
/// `transfer` blocks until the service gives a definitive answer; the claim
/// session applies no timeout of its own.
pub trait Wallet {
    fn transfer(&self, request: &ClaimRequest, token: &str) -> Result<TransferReceipt, WalletError>;
}

/// Result of a successful claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimReceipt {
    pub batches: usize,
    pub coins: f64,
    pub xp: u64,
    pub transfer: TransferReceipt,
}

/// Non-error claim results
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Claimed(ClaimReceipt),
    /// No whole unclaimed batch yet
    NotReady { tasks_remaining: usize },
    /// Every batch that can ever complete has been claimed
    Exhausted,
    /// Another claim for this session has not resolved; nothing was sent
    InFlight,
}

impl ClaimOutcome {
    /// Message shown to the player
    pub fn message(&self) -> String {
        match self {
            ClaimOutcome::Claimed(receipt) => format!(
                "Your rewards have been added to your wallet! +{:.2} coins, +{} XP",
                receipt.coins, receipt.xp
            ),
            ClaimOutcome::NotReady { tasks_remaining } => format!(
                "Complete {} more task{} to unlock your next reward batch!",
                tasks_remaining,
                if *tasks_remaining == 1 { "" } else { "s" }
            ),
            ClaimOutcome::Exhausted => "All reward batches for this game have been claimed.".to_string(),
            ClaimOutcome::InFlight => "Claim already in progress".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClaimError {
    #[error("Missing {0}. Cannot claim rewards.")]
    MissingIdentity(&'static str),

    #[error("Failed to claim rewards. Please try again.")]
    Transfer(#[source] WalletError),
}

/// Releases the in-flight flag on every exit path
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One player's claim session for one game
pub struct ClaimSession {
    game_id: String,
    title: String,
    token: Option<String>,
    state: Mutex<RewardAccrualState>,
    in_flight: AtomicBool,
}

impl ClaimSession {
    /// Start a fresh session
    pub fn new(game_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            title: title.into(),
            token: None,
            state: Mutex::new(RewardAccrualState::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Start a fresh session for a game, titled as the game displays itself
    pub fn for_game(game: &GameDefinition) -> Self {
        Self::new(game.id.clone(), game.display_title())
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resume from a previously stored state
    pub fn with_state(self, state: RewardAccrualState) -> Self {
        *self.state.lock() = state;
        self
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Consistent snapshot of the accrual state
    pub fn state(&self) -> RewardAccrualState {
        *self.state.lock()
    }

    pub fn is_claiming(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// End the session, discarding claim progress.
    ///
    /// Refused while a claim is in flight, since its transfer would land on
    /// the zeroed state. Returns whether the state was reset.
    pub fn reset(&self) -> bool {
        match InFlightGuard::acquire(&self.in_flight) {
            Some(_guard) => {
                *self.state.lock() = RewardAccrualState::new();
                true
            }
            None => {
                log::warn!("Reset of game {} refused: a claim is in flight", self.game_id);
                false
            }
        }
    }

    /// Rewards claimable for `completed_unlocked` completed unlocked tasks
    pub fn available(
        &self,
        completed_unlocked: usize,
        policy: &ProgressionPolicy,
        schedule: &RewardSchedule,
    ) -> BatchRewards {
        let claimed = self.state().claimed_batch_count;
        calculate_batch_rewards(completed_unlocked, policy, claimed, schedule)
    }

    /// Claim every completed, unclaimed batch.
    ///
    /// State only changes after the wallet confirms the transfer. A failed
    /// transfer leaves the same batches claimable for a retry.
    pub fn claim<W: Wallet + ?Sized>(
        &self,
        wallet: &W,
        completed_unlocked: usize,
        policy: &ProgressionPolicy,
        schedule: &RewardSchedule,
    ) -> Result<ClaimOutcome, ClaimError> {
        let _guard = match InFlightGuard::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => {
                log::warn!("Claim for game {} ignored: another claim is in flight", self.game_id);
                return Ok(ClaimOutcome::InFlight);
            }
        };

        let rewards = self.available(completed_unlocked, policy, schedule);
        if !rewards.can_claim {
            return Ok(match rewards.tasks_remaining() {
                0 => ClaimOutcome::Exhausted,
                tasks_remaining => ClaimOutcome::NotReady { tasks_remaining },
            });
        }

        if self.game_id.trim().is_empty() {
            return Err(ClaimError::MissingIdentity("game id"));
        }
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ClaimError::MissingIdentity("auth token"))?;

        let request = ClaimRequest {
            game_id: self.game_id.clone(),
            coins: rewards.available_coins,
            xp: rewards.available_xp,
            reason: format!(
                "Game session completion - {} - {} batches claimed",
                self.title, rewards.available_batch_count
            ),
            first_batch: rewards.completed_batch_count.saturating_sub(rewards.available_batch_count),
            batch_count: rewards.available_batch_count,
        };

        let transfer = wallet.transfer(&request, token).map_err(|e| {
            log::warn!("Claim for game {} failed: {}", self.game_id, e);
            ClaimError::Transfer(e)
        })?;

        self.state.lock().record_claim(
            rewards.available_batch_count,
            rewards.available_coins,
            rewards.available_xp,
        );
        log::info!(
            "Claimed {} batch(es) for game {}: {:.2} coins, {} XP",
            rewards.available_batch_count,
            self.game_id,
            rewards.available_coins,
            rewards.available_xp
        );

        Ok(ClaimOutcome::Claimed(ClaimReceipt {
            batches: rewards.available_batch_count,
            coins: rewards.available_coins,
            xp: rewards.available_xp,
            transfer,
        }))
    }
}
