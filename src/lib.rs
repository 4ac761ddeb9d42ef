//! Goalrush - progressive rewards for play-to-earn game sessions
//!
//! Players complete in-game goals in batches. Finished batches unlock the
//! next ones and pay out coins and XP that can be claimed into a wallet.

pub mod progression;
pub mod goals;
pub mod rewards;
pub mod engine;
pub mod data;
pub mod save;

// Re-export commonly used types
pub use engine::{EngineConfig, Evaluation, RewardEngine, TaskView};
pub use goals::{GameDefinition, Task};
pub use progression::{ProgressionPolicy, UnlockDecision, XpConfig};
pub use rewards::{ClaimOutcome, ClaimSession, RewardAccrualState, Wallet};
