//! Game definitions
//!
//! Everything the goal, policy and XP providers supply about one game.

use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::progression::{ProgressionPolicy, XpConfig};

/// A game with its ordered goals and reward configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Ordered goal list; position is the task index
    #[serde(default)]
    pub goals: Vec<Task>,
    /// Missing policy means legacy groups of three
    #[serde(default)]
    pub task_progression: Option<ProgressionPolicy>,
    /// Missing config means 1 XP per task
    #[serde(default, rename = "xpRewardConfig")]
    pub xp_config: Option<XpConfig>,
    /// Explicit XP total advertised for the game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards_xp: Option<u64>,
}

impl GameDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_goals(mut self, goals: Vec<Task>) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_policy(mut self, policy: ProgressionPolicy) -> Self {
        self.task_progression = Some(policy);
        self
    }

    pub fn with_xp(mut self, xp: XpConfig) -> Self {
        self.xp_config = Some(xp);
        self
    }

    pub fn policy(&self) -> ProgressionPolicy {
        self.task_progression.unwrap_or_default()
    }

    pub fn xp(&self) -> XpConfig {
        self.xp_config.unwrap_or_default()
    }

    /// Title used in claim reasons and reports
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Unknown Game"
        } else {
            &self.title
        }
    }

    /// XP advertised for the whole game
    pub fn total_obtainable_xp(&self) -> u64 {
        self.rewards_xp
            .unwrap_or_else(|| self.xp().total_xp(self.goals.len()))
    }

    /// Mark a goal completed, returning false if it was already done or missing
    pub fn complete_goal(&mut self, index: usize) -> bool {
        match self.goals.get_mut(index) {
            Some(goal) if !goal.completed => {
                goal.completed = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_config_missing() {
        let game: GameDefinition = serde_json::from_str(r#"{ "id": "g1", "goals": [{}, {}] }"#).unwrap();
        assert_eq!(game.policy(), ProgressionPolicy::legacy());
        assert_eq!(game.xp(), XpConfig::default());
        assert_eq!(game.total_obtainable_xp(), 2);
        assert_eq!(game.display_title(), "Unknown Game");
    }

    #[test]
    fn test_explicit_xp_total_wins() {
        let mut game = GameDefinition::new("g2", "Solitaire")
            .with_goals(vec![Task::new("a", 1.0), Task::new("b", 1.0), Task::new("c", 1.0)])
            .with_xp(XpConfig::new(1.0, 2.0));
        assert_eq!(game.total_obtainable_xp(), 7);

        game.rewards_xp = Some(300);
        assert_eq!(game.total_obtainable_xp(), 300);
    }

    #[test]
    fn test_parse_provider_game() {
        let json = r#"{
            "id": "g3",
            "title": "Bingo Blitz",
            "taskProgression": {
                "hasProgressionRule": true,
                "firstBatchSize": 3,
                "nextBatchSize": 2,
                "canUnlockNextTasks": true
            },
            "xpRewardConfig": { "baseXP": 5, "multiplier": 1.2 },
            "goals": [{ "text": "Install", "amount": 0.5, "completed": true }]
        }"#;
        let game: GameDefinition = serde_json::from_str(json).unwrap();
        let policy = game.policy();
        assert!(policy.has_progression_rule);
        assert_eq!(policy.first_batch_size, 3);
        assert!(!policy.threshold_reached);
        assert_eq!(game.xp(), XpConfig::new(5.0, 1.2));
        assert!(game.goals[0].completed);
    }

    #[test]
    fn test_complete_goal() {
        let mut game = GameDefinition::new("g4", "Match 3").with_goals(vec![Task::new("a", 1.0)]);
        assert!(game.complete_goal(0));
        assert!(!game.complete_goal(0));
        assert!(!game.complete_goal(7));
    }
}
