//! Result types produced by the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::corpus::Problem;
use crate::injection::BugInjection;

/// A problem whose starting code is a candidate the tests were shown to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuggyProblem {
    /// The original descriptor, serialized inline.
    #[serde(flatten)]
    pub problem: Problem,
    /// The accepted buggy function body.
    pub starting_code: String,
    /// The model's explanation of the bug.
    pub bug_explanation: String,
}

impl BuggyProblem {
    /// Pairs a problem with the injection that failed its tests.
    pub fn new(problem: &Problem, injection: BugInjection) -> Self {
        Self {
            problem: problem.clone(),
            starting_code: injection.buggy_code,
            bug_explanation: injection.bug_explanation,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.problem.task_id
    }
}

/// Accepted buggy problems keyed by task id.
pub type ResultMapping = BTreeMap<String, BuggyProblem>;
