//! Progression systems
//!
//! Batch layout, task unlocking, and XP valuation.

pub mod policy;
pub mod unlocks;
pub mod xp;

pub use policy::{BatchLayout, ProgressionPolicy, FALLBACK_GROUP_SIZE};
pub use unlocks::{resolve_unlocks, is_locally_locked, UnlockDecision};
pub use xp::{XpConfig, XpTier, round2, task_xp, total_xp, tier_progress_percent};
