//! Batch reward calculation
//!
//! Only whole completed batches pay out. Batch `i` pays
//! `base_reward_per_batch + i * reward_increment` coins and a flat
//! `xp_per_batch` XP; batches already claimed this session are skipped.

use serde::{Deserialize, Serialize};

use crate::progression::{round2, ProgressionPolicy};

/// Coin and XP payout per completed batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSchedule {
    /// Coins paid for batch 0
    pub base_reward_per_batch: f64,
    /// Extra coins for each later batch
    pub reward_increment: f64,
    /// Flat XP for every batch, independent of per-task XP
    pub xp_per_batch: u64,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            base_reward_per_batch: 10.0,
            reward_increment: 5.0,
            xp_per_batch: 50,
        }
    }
}

impl RewardSchedule {
    /// Coins paid for batch `index`
    pub fn batch_reward(&self, index: usize) -> f64 {
        self.base_reward_per_batch + index as f64 * self.reward_increment
    }

    /// Coins paid for `count` batches starting at batch `first`
    pub fn coins_for(&self, first: usize, count: usize) -> f64 {
        let total: f64 = (first..first.saturating_add(count))
            .map(|i| self.batch_reward(i))
            .sum();
        round2(total)
    }

    pub fn xp_for(&self, count: usize) -> u64 {
        self.xp_per_batch.saturating_mul(count as u64)
    }
}

/// What a player can claim right now
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRewards {
    /// Whole batches completed so far
    pub completed_batch_count: usize,
    /// Completed batches not yet claimed
    pub available_batch_count: usize,
    pub available_coins: f64,
    #[serde(rename = "availableXP")]
    pub available_xp: u64,
    /// Tasks needed to complete the batch being filled
    pub next_batch_target: usize,
    /// Tasks completed within the batch being filled
    pub next_batch_progress: usize,
    pub can_claim: bool,
}

impl BatchRewards {
    /// Tasks still missing before the next batch completes
    pub fn tasks_remaining(&self) -> usize {
        self.next_batch_target.saturating_sub(self.next_batch_progress)
    }
}

/// Compute claimable rewards from the number of completed unlocked tasks
pub fn calculate_batch_rewards(
    completed_unlocked: usize,
    policy: &ProgressionPolicy,
    claimed_batch_count: usize,
    schedule: &RewardSchedule,
) -> BatchRewards {
    let layout = policy.layout();
    let completed_batch_count = layout.completed_batches(completed_unlocked);
    let available_batch_count = completed_batch_count.saturating_sub(claimed_batch_count);

    let next_batch_target = layout.batch_size(completed_batch_count);
    let next_batch_progress = layout.progress_in_current_batch(completed_unlocked);

    BatchRewards {
        completed_batch_count,
        available_batch_count,
        available_coins: schedule.coins_for(claimed_batch_count, available_batch_count),
        available_xp: schedule.xp_for(available_batch_count),
        next_batch_target,
        next_batch_progress,
        can_claim: available_batch_count > 0,
    }
}
