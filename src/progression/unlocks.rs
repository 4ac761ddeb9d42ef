//! Task unlock resolution
//!
//! Decides which tasks of a game are playable. A task's lock state depends
//! on its index, on the completion of tasks before it, and on the policy.
//! Its own completion never matters.

use serde::{Deserialize, Serialize};

use super::policy::{BatchLayout, ProgressionPolicy};
use crate::goals::Task;

/// Lock decision for a single task, tagged with where it came from.
///
/// Serializes flat as `{"unlockSource": "serverProvided", "isLocked": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unlockSource", rename_all = "camelCase")]
pub enum UnlockDecision {
    /// The backend already computed progression for this task
    ServerProvided {
        #[serde(rename = "isLocked")]
        locked: bool,
    },
    /// Computed locally from the progression policy
    LocallyComputed {
        #[serde(rename = "isLocked")]
        locked: bool,
    },
}

impl UnlockDecision {
    pub fn is_locked(&self) -> bool {
        match *self {
            UnlockDecision::ServerProvided { locked } | UnlockDecision::LocallyComputed { locked } => {
                locked
            }
        }
    }

    pub fn is_server_provided(&self) -> bool {
        matches!(self, UnlockDecision::ServerProvided { .. })
    }
}

/// Resolve the lock state of every task, in task order
pub fn resolve_unlocks(tasks: &[Task], policy: &ProgressionPolicy) -> Vec<UnlockDecision> {
    let layout = policy.layout();
    if let BatchLayout::Progressive { next: 0, .. } = layout {
        if tasks.len() > policy.first_batch_size {
            log::warn!(
                "Progression policy has zero-sized follow-up batches; {} task(s) stay locked",
                tasks.len() - policy.first_batch_size
            );
        }
    }

    let resolver = Resolver::new(tasks, layout, policy.gate_open());
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| match &task.progression {
            Some(server) => UnlockDecision::ServerProvided { locked: server.is_locked },
            None => UnlockDecision::LocallyComputed { locked: resolver.is_locked(index) },
        })
        .collect()
}

/// Local lock computation for a single task index
pub fn is_locally_locked(tasks: &[Task], policy: &ProgressionPolicy, index: usize) -> bool {
    Resolver::new(tasks, policy.layout(), policy.gate_open()).is_locked(index)
}

/// Batch completion, computed once per task list
struct Resolver {
    layout: BatchLayout,
    gate_open: bool,
    /// `complete[b]`: every task of batch `b` is completed
    complete: Vec<bool>,
    /// `all_before[b]`: every batch before `b` is completed
    all_before: Vec<bool>,
}

impl Resolver {
    fn new(tasks: &[Task], layout: BatchLayout, gate_open: bool) -> Self {
        // Tasks past a zero-sized batch chain map to no batch; only batch 0 exists then
        let batches = match tasks.len().checked_sub(1) {
            Some(last) => layout.batch_of(last).map_or(1, |b| b + 1),
            None => 0,
        };
        let complete: Vec<bool> = (0..batches)
            .map(|batch| {
                let range = layout.batch_range(batch, tasks.len());
                tasks[range].iter().all(|t| t.completed)
            })
            .collect();
        let mut all_before = Vec::with_capacity(batches + 1);
        all_before.push(true);
        for &done in &complete {
            let prev = all_before.last().copied().unwrap_or(true);
            all_before.push(prev && done);
        }

        Self {
            layout,
            gate_open,
            complete,
            all_before,
        }
    }

    /// Every task in the batch is completed. An empty batch blocks nothing.
    fn batch_complete(&self, batch: usize) -> bool {
        self.complete.get(batch).copied().unwrap_or(true)
    }

    /// Every batch before `batch` is completed
    fn complete_before(&self, batch: usize) -> bool {
        let at = batch.min(self.all_before.len() - 1);
        self.all_before[at]
    }

    fn is_locked(&self, index: usize) -> bool {
        let batch = match self.layout.batch_of(index) {
            Some(batch) => batch,
            // Beyond a zero-sized batch chain: never reachable
            None => return true,
        };
        if batch == 0 {
            return false;
        }

        match self.layout {
            // Legacy groups only look at the group right before
            BatchLayout::Fixed { .. } => !self.batch_complete(batch - 1),
            // Completing every earlier batch is necessary but not sufficient
            BatchLayout::Progressive { .. } => !(self.complete_before(batch) && self.gate_open),
        }
    }
}
