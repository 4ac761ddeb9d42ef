//! Batch rewards and claiming

pub mod batch;
pub mod claim;

pub use batch::{calculate_batch_rewards, BatchRewards, RewardSchedule};
pub use claim::{
    ClaimError, ClaimOutcome, ClaimReceipt, ClaimRequest, ClaimSession,
    RewardAccrualState, TransferReceipt, Wallet, WalletError,
};
