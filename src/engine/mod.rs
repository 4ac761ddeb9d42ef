//! Progressive reward engine
//!
//! Single entry point for everything the game-details, coin and XP views
//! need: unlock state, per-task XP, claimable batches, and the claim itself.

mod evaluation;

pub use evaluation::{Evaluation, TaskView};

use serde::{Deserialize, Serialize};

use crate::goals::{GameDefinition, Task};
use crate::progression::{resolve_unlocks, round2, UnlockDecision};
use crate::rewards::{
    calculate_batch_rewards, ClaimError, ClaimOutcome, ClaimSession, RewardAccrualState,
    RewardSchedule, Wallet,
};

/// Tunable engine settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub schedule: RewardSchedule,
    /// Completed unlocked tasks per milestone; 0 disables milestones
    pub milestone_level: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schedule: RewardSchedule::default(),
            milestone_level: 3,
        }
    }
}

/// Pure evaluation plus the guarded claim
#[derive(Debug, Clone, Default)]
pub struct RewardEngine {
    config: EngineConfig,
}

impl RewardEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a game against a claim state
    pub fn evaluate(&self, game: &GameDefinition, state: &RewardAccrualState) -> Evaluation {
        let policy = game.policy();
        let xp = game.xp();
        let decisions = resolve_unlocks(&game.goals, &policy);
        let completed_unlocked = completed_unlocked_count(&game.goals, &decisions);

        let per_task: Vec<TaskView> = game
            .goals
            .iter()
            .zip(&decisions)
            .enumerate()
            .map(|(index, (task, &decision))| {
                let xp_value = xp.task_xp(index);
                TaskView {
                    index,
                    title: task.title.clone(),
                    decision,
                    xp_value,
                    xp_reward: if task.completed { xp_value } else { 0.0 },
                    coin_reward: task.coin_reward(),
                    status: task.status(),
                    section_label: task.section.label(),
                    is_turbo: task.is_turbo(),
                    time_limit: task.time_limit_label(),
                }
            })
            .collect();

        let session_coins = round2(per_task.iter().map(|t| t.coin_reward).sum());
        let session_xp = round2(per_task.iter().map(|t| t.xp_reward).sum());
        let rewards = calculate_batch_rewards(
            completed_unlocked,
            &policy,
            state.claimed_batch_count,
            &self.config.schedule,
        );

        let max_coins = self.config.schedule.coins_for(0, rewards.completed_batch_count);
        let max_xp = (max_coins * 0.1).floor() as u64;

        log::debug!(
            "Evaluated game {}: {} task(s), {} completed unlocked, {} batch(es) claimable",
            game.id,
            per_task.len(),
            completed_unlocked,
            rewards.available_batch_count
        );

        Evaluation {
            per_task,
            rewards,
            completed_unlocked_count: completed_unlocked,
            session_coins,
            session_xp,
            max_coins,
            coin_progress_percent: progress_percent(session_coins, max_coins),
            max_xp,
            xp_progress_percent: progress_percent(session_xp, max_xp as f64),
            total_xp: game.total_obtainable_xp(),
            milestone_reached: milestone_reached(completed_unlocked, self.config.milestone_level),
        }
    }

    /// Evaluate using the session's current claim state
    pub fn evaluate_session(&self, game: &GameDefinition, session: &ClaimSession) -> Evaluation {
        self.evaluate(game, &session.state())
    }

    /// Claim everything currently available for this game
    pub fn claim<W: Wallet + ?Sized>(
        &self,
        game: &GameDefinition,
        session: &ClaimSession,
        wallet: &W,
    ) -> Result<ClaimOutcome, ClaimError> {
        let policy = game.policy();
        let decisions = resolve_unlocks(&game.goals, &policy);
        let completed_unlocked = completed_unlocked_count(&game.goals, &decisions);
        session.claim(wallet, completed_unlocked, &policy, &self.config.schedule)
    }
}

/// Completed tasks that are also unlocked
pub fn completed_unlocked_count(tasks: &[Task], decisions: &[UnlockDecision]) -> usize {
    tasks
        .iter()
        .zip(decisions)
        .filter(|(task, decision)| task.completed && !decision.is_locked())
        .count()
}

/// Share of `max` reached, in percent; not capped at 100
fn progress_percent(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value * 100.0 / max
    } else {
        0.0
    }
}

/// Milestones fall on every multiple of `milestone_level` completed tasks
pub fn milestone_reached(completed_unlocked: usize, milestone_level: usize) -> bool {
    completed_unlocked > 0
        && completed_unlocked
            .checked_rem(milestone_level)
            .is_some_and(|rest| rest == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::ServerProgression;
    use crate::progression::{ProgressionPolicy, XpConfig};
    use crate::rewards::{TransferReceipt, WalletError};
    use crate::rewards::ClaimRequest;

    struct AcceptingWallet;

    impl Wallet for AcceptingWallet {
        fn transfer(&self, request: &ClaimRequest, _token: &str) -> Result<TransferReceipt, WalletError> {
            Ok(TransferReceipt {
                coins_transferred: request.coins,
                xp_transferred: request.xp,
            })
        }
    }

    fn game(completed: &[bool], policy: ProgressionPolicy) -> GameDefinition {
        let goals = completed
            .iter()
            .enumerate()
            .map(|(i, &done)| Task::new(format!("Level {}", i + 1), 0.5).completed(done))
            .collect();
        GameDefinition::new("game-1", "Puzzle Rush")
            .with_goals(goals)
            .with_policy(policy)
    }

    #[test]
    fn test_legacy_scenario() {
        let mut completed = vec![false; 9];
        completed[..3].fill(true);
        let eval = RewardEngine::default().evaluate(
            &game(&completed, ProgressionPolicy::legacy()),
            &RewardAccrualState::new(),
        );

        let locked: Vec<bool> = eval.per_task.iter().map(|t| t.is_locked()).collect();
        assert_eq!(locked, vec![false, false, false, false, false, false, true, true, true]);
        assert_eq!(eval.active().count(), 6);
        assert_eq!(eval.locked().count(), 3);
        assert_eq!(eval.completed_unlocked_count, 3);
        assert!(eval.milestone_reached);
    }

    #[test]
    fn test_policy_scenario_through_claims() {
        let engine = RewardEngine::default();
        let mut game = game(&[true, true, true, false, false], ProgressionPolicy::batched(3, 2));
        let session = ClaimSession::new("game-1", "Puzzle Rush").with_token("tok");

        let eval = engine.evaluate_session(&game, &session);
        assert_eq!(eval.rewards.completed_batch_count, 1);
        assert_eq!(eval.rewards.available_batch_count, 1);
        assert_eq!(eval.rewards.available_coins, 10.0);
        assert_eq!(eval.rewards.available_xp, 50);
        assert!(eval.can_claim());

        let outcome = engine.claim(&game, &session, &AcceptingWallet).unwrap();
        assert!(matches!(outcome, ClaimOutcome::Claimed(_)));
        assert_eq!(session.state().claimed_batch_count, 1);

        let eval = engine.evaluate_session(&game, &session);
        assert_eq!(eval.rewards.available_batch_count, 0);
        assert!(!eval.can_claim());

        game.complete_goal(3);
        game.complete_goal(4);
        let eval = engine.evaluate_session(&game, &session);
        assert_eq!(eval.rewards.completed_batch_count, 2);
        assert_eq!(eval.rewards.available_batch_count, 1);
        assert_eq!(eval.rewards.available_coins, 15.0);
    }

    #[test]
    fn test_locked_completions_do_not_count() {
        // Task 5 reports completed but its batch is still locked
        let eval = RewardEngine::default().evaluate(
            &game(&[true, true, true, false, false, true], ProgressionPolicy::batched(3, 2)),
            &RewardAccrualState::new(),
        );
        assert!(eval.per_task[5].is_locked());
        assert_eq!(eval.completed_unlocked_count, 3);
        // Its coins still show in the session totals
        assert_eq!(eval.session_coins, 2.0);
    }

    #[test]
    fn test_per_task_xp_and_totals() {
        let game = game(&[true, false, true], ProgressionPolicy::legacy()).with_xp(XpConfig::new(1.0, 2.0));
        let eval = RewardEngine::default().evaluate(&game, &RewardAccrualState::new());

        let values: Vec<f64> = eval.per_task.iter().map(|t| t.xp_value).collect();
        assert_eq!(values, vec![1.0, 2.0, 4.0]);
        assert_eq!(eval.per_task[1].xp_reward, 0.0);
        assert_eq!(eval.session_xp, 5.0);
        assert_eq!(eval.total_xp, 7);
        assert_eq!(eval.session_coins, 1.0);
    }

    #[test]
    fn test_empty_game() {
        let eval = RewardEngine::default().evaluate(
            &GameDefinition::new("empty", ""),
            &RewardAccrualState::new(),
        );
        assert!(eval.per_task.is_empty());
        assert!(!eval.can_claim());
        assert!(!eval.milestone_reached);
        assert_eq!(eval.total_xp, 0);
    }

    #[test]
    fn test_milestone_reached() {
        assert!(!milestone_reached(0, 3));
        assert!(!milestone_reached(4, 3));
        assert!(milestone_reached(6, 3));
        assert!(!milestone_reached(6, 0));
    }

    #[test]
    fn test_evaluation_json_shape() {
        let mut game = game(&[true, true, true, false], ProgressionPolicy::legacy());
        game.goals[3].progression = Some(ServerProgression {
            is_locked: true,
            ..ServerProgression::default()
        });
        let eval = RewardEngine::default().evaluate(&game, &RewardAccrualState::new());
        let json = serde_json::to_value(&eval).unwrap();

        assert_eq!(json["completedBatchCount"], 1);
        assert_eq!(json["availableBatchCount"], 1);
        assert_eq!(json["availableCoins"], 10.0);
        assert_eq!(json["availableXP"], 50);
        assert_eq!(json["nextBatchTarget"], 3);
        assert_eq!(json["nextBatchProgress"], 0);
        assert_eq!(json["canClaim"], true);
        assert_eq!(json["totalXP"], 4);

        let first = &json["perTask"][0];
        assert_eq!(first["isLocked"], false);
        assert_eq!(first["xpValue"], 1.0);
        assert_eq!(first["unlockSource"], "locallyComputed");
        assert_eq!(first["status"], "completed");
        assert_eq!(json["perTask"][3]["isLocked"], true);
        assert_eq!(json["perTask"][3]["unlockSource"], "serverProvided");

        assert!(json.get("per_task").is_none());
        assert!(first.get("decision").is_none());
    }

    #[test]
    fn test_coin_and_xp_progress() {
        let mut completed = vec![false; 9];
        completed[..6].fill(true);
        let xp_game = game(&completed, ProgressionPolicy::legacy()).with_xp(XpConfig::new(1.0, 1.0));
        let eval = RewardEngine::default().evaluate(&xp_game, &RewardAccrualState::new());

        // Batches 0 and 1 complete: 10 + 15 coins, a tenth of that as the XP cap
        assert_eq!(eval.max_coins, 25.0);
        assert_eq!(eval.max_xp, 2);
        assert_eq!(eval.session_coins, 3.0);
        assert_eq!(eval.coin_progress_percent, 12.0);
        assert_eq!(eval.session_xp, 6.0);
        assert_eq!(eval.xp_progress_percent, 300.0);

        let empty = RewardEngine::default().evaluate(
            &game(&[true, false], ProgressionPolicy::legacy()),
            &RewardAccrualState::new(),
        );
        assert_eq!(empty.max_coins, 0.0);
        assert_eq!(empty.coin_progress_percent, 0.0);
        assert_eq!(empty.xp_progress_percent, 0.0);
    }
}
