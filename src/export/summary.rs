//! End-of-run counts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::ResultMapping;

/// Totals for one bug generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Problems in the corpus that were dispatched.
    pub total_problems: usize,
    /// Problems with a verified buggy starting code.
    pub buggy_problems: usize,
    /// When the summary was taken.
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(total_problems: usize, buggy: &ResultMapping) -> Self {
        Self {
            total_problems,
            buggy_problems: buggy.len(),
            finished_at: Utc::now(),
        }
    }

    /// Problems left without a bug.
    pub fn skipped(&self) -> usize {
        self.total_problems.saturating_sub(self.buggy_problems)
    }

    /// Share of problems that received a bug, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total_problems == 0 {
            return 0.0;
        }
        (self.buggy_problems as f64 / self.total_problems as f64) * 100.0
    }

    /// The two plain-text summary lines.
    pub fn render(&self) -> String {
        format!(
            "Total problems: {}\nBuggy problems created: {}",
            self.total_problems, self.buggy_problems
        )
    }
}
