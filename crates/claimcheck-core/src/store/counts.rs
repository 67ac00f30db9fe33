use serde::{Deserialize, Serialize};

use crate::domain::{Decision, TaskRecord, TaskStatus};

/// Tally of the task list by lifecycle status and by decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub error: usize,
    pub accept: usize,
    pub review: usize,
    pub reject: usize,
}

impl TaskCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TaskRecord>) -> Self {
        let mut counts = TaskCounts::default();
        for record in records {
            match record.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Processing => counts.processing += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Error => counts.error += 1,
            }
            if let Some(result) = &record.result {
                match result.decision {
                    Some(Decision::Accept) => counts.accept += 1,
                    Some(Decision::Review) => counts.review += 1,
                    Some(Decision::Reject) => counts.reject += 1,
                    _ => {}
                }
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.error
    }

    /// Tasks a poller is still watching.
    pub fn in_flight(&self) -> usize {
        self.pending + self.processing
    }
}
