//! Task records
//!
//! A task (goal) is one unit of in-game work a player completes for coins.
//! Records arrive from the goal provider in display order; position in the
//! list is the task index.

use serde::{Deserialize, Serialize};

/// Section a goal is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Linear,
    Turbo,
    Bonus,
    Install,
    Daily,
    #[serde(other)]
    Other,
}

impl Section {
    /// Short label shown on the task badge
    pub fn label(&self) -> &'static str {
        match self {
            Section::Linear => "Goal",
            Section::Turbo => "Turbo",
            Section::Bonus => "Bonus",
            Section::Install => "Install",
            Section::Daily => "Daily",
            Section::Other => "Task",
        }
    }
}

/// Whether a goal must be done in order
///
/// Carried as the provider's string so unknown types read as linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalKind {
    #[default]
    Linear,
    /// Shown as a turbo task
    NonLinear,
}

impl From<String> for GoalKind {
    fn from(value: String) -> Self {
        if value == "non-linear" {
            GoalKind::NonLinear
        } else {
            GoalKind::Linear
        }
    }
}

impl From<GoalKind> for String {
    fn from(kind: GoalKind) -> Self {
        match kind {
            GoalKind::Linear => "linear".to_string(),
            GoalKind::NonLinear => "non-linear".to_string(),
        }
    }
}

/// Per-task progression decided by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProgression {
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unlocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<usize>,
}

/// Derived state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Failed,
    Expired,
    Pending,
}

impl TaskStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Expired => "expired",
            TaskStatus::Pending => "pending",
        }
    }
}

/// One goal in a game
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    /// Provider-side goal identifier
    #[serde(default)]
    pub goal_id: Option<String>,
    /// Goal description
    #[serde(default, rename = "text")]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub failed: bool,
    /// Days until the goal expires, `None` for no time limit
    #[serde(default)]
    pub days_left: Option<i32>,
    /// Coin value credited once the goal is completed
    #[serde(default, rename = "amount")]
    pub reward_amount: f64,
    #[serde(default)]
    pub section: Section,
    #[serde(default)]
    pub goal_type: GoalKind,
    /// Authoritative lock state from the backend, when it computed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progression: Option<ServerProgression>,
}

impl Task {
    /// Create a pending task worth `reward_amount` coins
    pub fn new(title: impl Into<String>, reward_amount: f64) -> Self {
        Self {
            title: title.into(),
            reward_amount,
            ..Self::default()
        }
    }

    /// Builder-style completion flag
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Builder-style server override
    pub fn with_server_lock(mut self, is_locked: bool) -> Self {
        self.progression = Some(ServerProgression {
            is_locked,
            is_unlocked: Some(!is_locked),
            ..ServerProgression::default()
        });
        self
    }

    /// Past its deadline without being completed
    pub fn is_expired(&self) -> bool {
        !self.completed && self.days_left.is_some_and(|days| days <= 0)
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else if self.failed {
            TaskStatus::Failed
        } else if self.is_expired() {
            TaskStatus::Expired
        } else {
            TaskStatus::Pending
        }
    }

    /// Turbo tasks are the non-linear ones
    pub fn is_turbo(&self) -> bool {
        self.goal_type == GoalKind::NonLinear
    }

    /// Coins credited for this task (only once completed)
    pub fn coin_reward(&self) -> f64 {
        if self.completed {
            self.reward_amount
        } else {
            0.0
        }
    }

    /// Human-readable time limit
    pub fn time_limit_label(&self) -> String {
        match self.days_left {
            None => "No limit".to_string(),
            Some(days) if days <= 0 => "Expired".to_string(),
            Some(1) => "1 day left".to_string(),
            Some(days) => format!("{} days left", days),
        }
    }
}
