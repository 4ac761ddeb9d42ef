//! Experience valuation and tiers
//!
//! Per-task XP grows geometrically with the task index. The total a game can
//! award is the matching geometric series, floored for display. The two
//! roundings are independent: a displayed total need not equal the sum of
//! the displayed per-task values.
//!
//! This schedule is separate from the flat XP paid per claimed batch.

use serde::{Deserialize, Serialize};

/// XP reward configuration for a game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XpConfig {
    #[serde(rename = "baseXP")]
    pub base_xp: f64,
    pub multiplier: f64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self { base_xp: 1.0, multiplier: 1.0 }
    }
}

impl XpConfig {
    pub fn new(base_xp: f64, multiplier: f64) -> Self {
        Self { base_xp, multiplier }
    }

    /// XP value of the task at `index`
    pub fn task_xp(&self, index: usize) -> f64 {
        task_xp(self.base_xp, self.multiplier, index)
    }

    /// Total XP obtainable from `task_count` tasks
    pub fn total_xp(&self, task_count: usize) -> u64 {
        total_xp(self.base_xp, self.multiplier, task_count)
    }
}

/// Round to two decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `base_xp * multiplier^index`, rounded to two decimals
pub fn task_xp(base_xp: f64, multiplier: f64, index: usize) -> f64 {
    round2(base_xp * multiplier.powf(index as f64))
}

/// Sum of the geometric series over `task_count` tasks, floored
pub fn total_xp(base_xp: f64, multiplier: f64, task_count: usize) -> u64 {
    if task_count == 0 {
        return 0;
    }
    let n = task_count as f64;
    let total = if (multiplier - 1.0).abs() < f64::EPSILON {
        base_xp * n
    } else {
        base_xp * (multiplier.powf(n) - 1.0) / (multiplier - 1.0)
    };
    // Float-to-int casts saturate, so overflow and NaN stay well defined
    total.floor() as u64
}

// =============================================================================
// XP Tiers
// =============================================================================

/// Coarse player level derived from cumulative XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum XpTier {
    Junior,
    MidLevel,
    Senior,
}

impl XpTier {
    pub const ALL: [XpTier; 3] = [XpTier::Junior, XpTier::MidLevel, XpTier::Senior];

    /// XP needed to enter this tier
    pub fn threshold(&self) -> u64 {
        match self {
            XpTier::Junior => 0,
            XpTier::MidLevel => 5_000,
            XpTier::Senior => 10_000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            XpTier::Junior => "Junior",
            XpTier::MidLevel => "Mid-level",
            XpTier::Senior => "Senior",
        }
    }

    /// Tier for a cumulative XP amount
    pub fn for_xp(xp: u64) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| xp >= tier.threshold())
            .unwrap_or(XpTier::Junior)
    }

    /// Next tier up, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            XpTier::Junior => Some(XpTier::MidLevel),
            XpTier::MidLevel => Some(XpTier::Senior),
            XpTier::Senior => None,
        }
    }
}

/// Progress towards the top tier, as a percentage capped at 100
pub fn tier_progress_percent(xp: u64) -> f64 {
    let goal = XpTier::Senior.threshold() as f64;
    (xp as f64 / goal * 100.0).min(100.0)
}
