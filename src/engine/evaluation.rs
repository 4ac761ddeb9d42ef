//! Evaluation results handed to the presentation layer

use serde::Serialize;

use crate::goals::TaskStatus;
use crate::progression::UnlockDecision;
use crate::rewards::BatchRewards;

/// Evaluated state of one task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub index: usize,
    pub title: String,
    /// Emitted flat as `isLocked` plus `unlockSource`
    #[serde(flatten)]
    pub decision: UnlockDecision,
    /// XP the task is worth, shown whether or not it is completed
    pub xp_value: f64,
    /// XP credited (zero until completed)
    pub xp_reward: f64,
    /// Coins credited (zero until completed)
    pub coin_reward: f64,
    pub status: TaskStatus,
    pub section_label: &'static str,
    pub is_turbo: bool,
    pub time_limit: String,
}

impl TaskView {
    pub fn is_locked(&self) -> bool {
        self.decision.is_locked()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Full engine output for one game and accrual state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub per_task: Vec<TaskView>,
    #[serde(flatten)]
    pub rewards: BatchRewards,
    /// Completed tasks among the unlocked ones
    pub completed_unlocked_count: usize,
    /// Coins earned by completed tasks (display only)
    pub session_coins: f64,
    /// Per-task XP earned by completed tasks (display only)
    #[serde(rename = "sessionXP")]
    pub session_xp: f64,
    /// Coins paid by every completed batch, claimed or not
    pub max_coins: f64,
    /// `session_coins` against `max_coins`, 0 when no batch is complete
    pub coin_progress_percent: f64,
    /// XP cap shown next to the coin bar: a tenth of `max_coins`, floored
    #[serde(rename = "maxXP")]
    pub max_xp: u64,
    pub xp_progress_percent: f64,
    /// XP the whole game can award
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub milestone_reached: bool,
}

impl Evaluation {
    /// Playable tasks
    pub fn active(&self) -> impl Iterator<Item = &TaskView> {
        self.per_task.iter().filter(|t| !t.is_locked())
    }

    pub fn locked(&self) -> impl Iterator<Item = &TaskView> {
        self.per_task.iter().filter(|t| t.is_locked())
    }

    pub fn can_claim(&self) -> bool {
        self.rewards.can_claim
    }
}
