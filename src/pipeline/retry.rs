//! Per-item generate-validate loop.
//!
//! A candidate is accepted as soon as the validator reports that it does
//! NOT pass the problem's tests. Generation and validation errors use up an
//! attempt and the loop carries on; running out of attempts is a normal
//! outcome, not an error.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::DEFAULT_MAX_ATTEMPTS;
use super::types::BuggyProblem;
use crate::corpus::Problem;
use crate::error::{GenerationError, ValidationError};
use crate::injection::{BugInjection, BugInjector};
use crate::oracle::CandidateValidator;

/// Why a single attempt produced no candidate.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Result of running the retry loop for one problem.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionOutcome {
    /// A candidate failed the tests on attempt number `attempts`.
    Accepted {
        problem: BuggyProblem,
        attempts: u32,
    },
    /// No failing candidate within the budget.
    Exhausted { attempts: u32 },
}

impl InjectionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, InjectionOutcome::Accepted { .. })
    }

    /// Attempts spent, including the accepted one.
    pub fn attempts(&self) -> u32 {
        match self {
            InjectionOutcome::Accepted { attempts, .. } | InjectionOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }

    pub fn into_buggy_problem(self) -> Option<BuggyProblem> {
        match self {
            InjectionOutcome::Accepted { problem, .. } => Some(problem),
            InjectionOutcome::Exhausted { .. } => None,
        }
    }
}

/// Runs up to `max_attempts` sequential inject-then-validate attempts.
pub struct RetryController {
    injector: Arc<dyn BugInjector>,
    validator: Arc<dyn CandidateValidator>,
    max_attempts: u32,
}

impl RetryController {
    /// Creates a controller with the default budget of three attempts.
    pub fn new(injector: Arc<dyn BugInjector>, validator: Arc<dyn CandidateValidator>) -> Self {
        Self {
            injector,
            validator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the attempt budget. A budget of 0 is treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Searches for a candidate that fails `problem`'s tests.
    pub async fn run(&self, problem: &Problem) -> InjectionOutcome {
        for attempt in 1..=self.max_attempts {
            match self.attempt(problem).await {
                Ok(Some(injection)) => {
                    info!(
                        task_id = %problem.task_id,
                        attempt,
                        "Bug accepted: candidate fails the tests"
                    );
                    return InjectionOutcome::Accepted {
                        problem: BuggyProblem::new(problem, injection),
                        attempts: attempt,
                    };
                }
                Ok(None) => {
                    debug!(
                        task_id = %problem.task_id,
                        attempt,
                        "Candidate still passes the tests, retrying"
                    );
                }
                Err(err) => {
                    warn!(
                        task_id = %problem.task_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Bug injection attempt failed"
                    );
                }
            }
        }

        InjectionOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    /// One attempt. `Ok(None)` means the candidate passed and is not a bug.
    async fn attempt(&self, problem: &Problem) -> Result<Option<BugInjection>, AttemptError> {
        let injection = self.injector.inject(problem).await?;
        let passed = self
            .validator
            .validate(problem, &injection.buggy_code)
            .await?;

        Ok((!passed).then_some(injection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Injector replaying a script of results, one per call.
    struct ScriptedInjector {
        script: Mutex<VecDeque<Result<&'static str, &'static str>>>,
        calls: AtomicU32,
    }

    impl ScriptedInjector {
        fn new(script: Vec<Result<&'static str, &'static str>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl BugInjector for ScriptedInjector {
        async fn inject(&self, _problem: &Problem) -> Result<BugInjection, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or(Err("script exhausted"));
            match next {
                Ok(code) => Ok(BugInjection {
                    bug_explanation: format!("changed to {code}"),
                    buggy_code: code.to_string(),
                }),
                Err(msg) => Err(GenerationError::Llm(LlmError::RequestFailed(msg.to_string()))),
            }
        }
    }

    /// Passes only `return a+b`; errors on `oracle-down`.
    struct AddValidator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl CandidateValidator for AddValidator {
        async fn validate(&self, _problem: &Problem, candidate: &str) -> Result<bool, ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if candidate == "oracle-down" {
                return Err(ValidationError::Wait(std::io::Error::other("sandbox down")));
            }
            Ok(candidate == "return a+b")
        }
    }

    fn problem() -> Problem {
        Problem::new(
            "task_1",
            "def add(a,b):",
            "return a+b",
            "def check(candidate):\n    assert candidate(2,3) == 5",
            "add",
        )
    }

    fn controller(
        script: Vec<Result<&'static str, &'static str>>,
    ) -> (RetryController, Arc<ScriptedInjector>, Arc<AddValidator>) {
        let injector = Arc::new(ScriptedInjector::new(script));
        let validator = Arc::new(AddValidator {
            calls: AtomicU32::new(0),
        });
        let controller = RetryController::new(injector.clone(), validator.clone());
        (controller, injector, validator)
    }

    #[tokio::test]
    async fn test_accepts_failing_candidate_on_first_attempt() {
        let (controller, injector, validator) = controller(vec![Ok("return a-b")]);

        let outcome = controller.run(&problem()).await;

        assert_eq!(outcome.attempts(), 1);
        let buggy = outcome.into_buggy_problem().expect("accepted");
        assert_eq!(buggy.starting_code, "return a-b");
        assert_eq!(buggy.bug_explanation, "changed to return a-b");
        assert_eq!(injector.calls.load(Ordering::SeqCst), 1);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausts_when_every_candidate_passes() {
        let (controller, injector, _) = controller(vec![Ok("return a+b"); 3]);

        let outcome = controller.run(&problem()).await;

        assert_eq!(outcome, InjectionOutcome::Exhausted { attempts: 3 });
        assert_eq!(injector.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_generation_errors_do_not_end_the_loop_early() {
        let (controller, injector, validator) =
            controller(vec![Err("timeout"), Err("bad json"), Ok("return a-b")]);

        let outcome = controller.run(&problem()).await;

        assert!(outcome.is_accepted());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(injector.calls.load(Ordering::SeqCst), 3);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_errors_consume_an_attempt() {
        let (controller, _, validator) =
            controller(vec![Ok("oracle-down"), Ok("return b+a"), Ok("return a*b")]);
        let controller = controller.with_max_attempts(2);

        let outcome = controller.run(&problem()).await;

        // "return b+a" is rejected by the stub validator, so attempt 2 wins.
        assert_eq!(outcome.attempts(), 2);
        assert!(outcome.is_accepted());
        assert_eq!(validator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_budget_is_respected_with_only_errors() {
        let (controller, injector, _) = controller(vec![]);
        let controller = controller.with_max_attempts(5);

        let outcome = controller.run(&problem()).await;

        assert_eq!(outcome, InjectionOutcome::Exhausted { attempts: 5 });
        assert_eq!(injector.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        let (controller, _, _) = controller(vec![]);
        assert_eq!(controller.with_max_attempts(0).max_attempts(), 1);
    }
}
