//! Progression policy and batch layout
//!
//! Describes how a game's ordered task list is cut into batches, and
//! answers the arithmetic questions both the unlock resolver and the
//! batch reward calculator ask about those batches.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Group size used when a game has no usable progression rule
pub const FALLBACK_GROUP_SIZE: usize = 3;

/// Batch sizing and gating flags supplied by the progression policy provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionPolicy {
    /// When false, tasks unlock in fixed groups of three
    pub has_progression_rule: bool,
    /// Size of batch 0, the always-unlocked leading group
    pub first_batch_size: usize,
    /// Size of every batch after the first
    pub next_batch_size: usize,
    /// Allows a completed batch to open the next one
    pub can_unlock_next_tasks: bool,
    /// Alternative gate that also allows a completed batch to open the next one
    pub threshold_reached: bool,
}

impl ProgressionPolicy {
    /// Policy-driven progression with both gates open
    pub fn batched(first_batch_size: usize, next_batch_size: usize) -> Self {
        Self {
            has_progression_rule: true,
            first_batch_size,
            next_batch_size,
            can_unlock_next_tasks: true,
            threshold_reached: false,
        }
    }

    /// Legacy policy: fixed groups of three, no gating
    pub fn legacy() -> Self {
        Self::default()
    }

    /// Whether a fully completed batch is allowed to open the next batch
    pub fn gate_open(&self) -> bool {
        self.can_unlock_next_tasks || self.threshold_reached
    }

    /// Resolve the batch layout this policy describes
    pub fn layout(&self) -> BatchLayout {
        if !self.has_progression_rule || self.first_batch_size == 0 {
            BatchLayout::Fixed { group_size: FALLBACK_GROUP_SIZE }
        } else {
            BatchLayout::Progressive {
                first: self.first_batch_size,
                next: self.next_batch_size,
            }
        }
    }
}

/// How task indices map onto batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchLayout {
    /// Equal-sized groups, each gated only on the previous group's completion
    Fixed { group_size: usize },
    /// A leading batch of `first` tasks followed by batches of `next` tasks
    Progressive { first: usize, next: usize },
}

impl BatchLayout {
    /// Batch number of a task index.
    ///
    /// Returns `None` for tasks that fall beyond batch 0 when the layout has
    /// zero-sized follow-up batches: such tasks belong to no reachable batch.
    pub fn batch_of(&self, index: usize) -> Option<usize> {
        match *self {
            BatchLayout::Fixed { group_size } => index.checked_div(group_size),
            BatchLayout::Progressive { first, next } => {
                if index < first {
                    Some(0)
                } else {
                    (index - first).checked_div(next).map(|b| b + 1)
                }
            }
        }
    }

    /// Index range of a batch, clipped to a task list of `len` tasks
    pub fn batch_range(&self, batch: usize, len: usize) -> Range<usize> {
        let (start, size) = match *self {
            BatchLayout::Fixed { group_size } => (batch.saturating_mul(group_size), group_size),
            BatchLayout::Progressive { first, next } => {
                if batch == 0 {
                    (0, first)
                } else {
                    (first.saturating_add((batch - 1).saturating_mul(next)), next)
                }
            }
        };
        let start = start.min(len);
        let end = start.saturating_add(size).min(len);
        start..end
    }

    /// Size of a batch before clipping to any task list
    pub fn batch_size(&self, batch: usize) -> usize {
        match *self {
            BatchLayout::Fixed { group_size } => group_size,
            BatchLayout::Progressive { first, next } => {
                if batch == 0 {
                    first
                } else {
                    next
                }
            }
        }
    }

    /// Number of whole batches covered by `completed` completed tasks
    pub fn completed_batches(&self, completed: usize) -> usize {
        match *self {
            BatchLayout::Fixed { group_size } => completed.checked_div(group_size).unwrap_or(0),
            BatchLayout::Progressive { first, next } => {
                if completed < first {
                    0
                } else {
                    // Zero-sized follow-up batches can never complete
                    1 + (completed - first).checked_div(next).unwrap_or(0)
                }
            }
        }
    }

    /// Completed tasks counted towards the batch currently being filled
    pub fn progress_in_current_batch(&self, completed: usize) -> usize {
        match *self {
            BatchLayout::Fixed { group_size } => completed.checked_rem(group_size).unwrap_or(0),
            BatchLayout::Progressive { first, next } => {
                if completed < first {
                    completed
                } else {
                    (completed - first).checked_rem(next).unwrap_or(0)
                }
            }
        }
    }
}
