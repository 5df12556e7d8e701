//! Oracle and validator traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::Problem;
use crate::error::ValidationError;

/// Outcome of running one completion against a problem's tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleVerdict {
    /// Whether every test passed.
    pub passed: bool,
    /// `"passed"`, `"timed out"` or `"failed: <reason>"`.
    pub result: String,
}

impl OracleVerdict {
    pub fn passed() -> Self {
        Self {
            passed: true,
            result: "passed".to_string(),
        }
    }

    pub fn failed(reason: impl AsRef<str>) -> Self {
        Self {
            passed: false,
            result: format!("failed: {}", reason.as_ref()),
        }
    }

    pub fn timed_out() -> Self {
        Self {
            passed: false,
            result: "timed out".to_string(),
        }
    }
}

/// Executes a completion against a problem's hidden tests.
#[async_trait]
pub trait CorrectnessOracle: Send + Sync {
    /// Runs `completion` in place of the reference body.
    async fn check(&self, problem: &Problem, completion: &str)
        -> Result<OracleVerdict, ValidationError>;
}

/// Pass/fail check of a candidate body.
#[async_trait]
pub trait CandidateValidator: Send + Sync {
    /// Returns `true` when `candidate` passes every test of `problem`.
    async fn validate(&self, problem: &Problem, candidate: &str) -> Result<bool, ValidationError>;
}

/// [`CandidateValidator`] over any [`CorrectnessOracle`].
pub struct OracleValidator<O> {
    oracle: O,
}

impl<O: CorrectnessOracle> OracleValidator<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

#[async_trait]
impl<O: CorrectnessOracle> CandidateValidator for OracleValidator<O> {
    async fn validate(&self, problem: &Problem, candidate: &str) -> Result<bool, ValidationError> {
        let verdict = self.oracle.check(problem, candidate).await?;
        debug!(task_id = %problem.task_id, result = %verdict.result, "Oracle verdict");
        Ok(verdict.passed)
    }
}
