//! Bounded fan-out of the retry loop across the whole corpus.
//!
//! Every problem gets its own tokio task; a semaphore caps how many are
//! actually generating or validating at once. Results are collected in
//! completion order by this coordinator, which is the only writer of the
//! result mapping. A worker that panics or overruns its deadline is
//! reported as skipped and the batch carries on.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use super::config::{PipelineConfig, DEFAULT_MAX_WORKERS};
use super::retry::{InjectionOutcome, RetryController};
use super::types::{BuggyProblem, ResultMapping};
use crate::corpus::Corpus;

/// Worker pool settings for a dispatch run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Maximum problems in flight.
    pub max_workers: usize,
    /// Deadline for one problem's retry loop.
    pub item_timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            item_timeout: None,
        }
    }
}

impl From<&PipelineConfig> for DispatchConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            item_timeout: config.item_timeout,
        }
    }
}

/// What happened to one problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Accepted(BuggyProblem),
    Exhausted { attempts: u32 },
    TimedOut(Duration),
    /// The worker itself failed (panic or cancellation).
    Failed(String),
}

impl From<InjectionOutcome> for ItemOutcome {
    fn from(outcome: InjectionOutcome) -> Self {
        match outcome {
            InjectionOutcome::Accepted { problem, .. } => ItemOutcome::Accepted(problem),
            InjectionOutcome::Exhausted { attempts } => ItemOutcome::Exhausted { attempts },
        }
    }
}

/// Why a problem is missing from the result mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Every attempt errored or produced a passing candidate.
    Exhausted { attempts: u32 },
    /// The per-item deadline elapsed.
    TimedOut { after_ms: u128 },
    /// The worker failed unexpectedly.
    Failed { detail: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Exhausted { attempts } => {
                write!(f, "no failing candidate after {} attempts", attempts)
            }
            SkipReason::TimedOut { after_ms } => write!(f, "timed out after {} ms", after_ms),
            SkipReason::Failed { detail } => write!(f, "worker failed: {}", detail),
        }
    }
}

/// Everything a dispatch run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Problems with a verified bug.
    pub buggy: ResultMapping,
    /// Problems without one, and why.
    pub skipped: BTreeMap<String, SkipReason>,
}

impl DispatchReport {
    /// Number of problems that reached a final outcome.
    pub fn processed(&self) -> usize {
        self.buggy.len() + self.skipped.len()
    }

    fn record(&mut self, task_id: String, outcome: ItemOutcome) {
        let reason = match outcome {
            ItemOutcome::Accepted(problem) => {
                self.buggy.insert(task_id, problem);
                return;
            }
            ItemOutcome::Exhausted { attempts } => SkipReason::Exhausted { attempts },
            ItemOutcome::TimedOut(limit) => SkipReason::TimedOut {
                after_ms: limit.as_millis(),
            },
            ItemOutcome::Failed(detail) => SkipReason::Failed { detail },
        };

        warn!(task_id = %task_id, reason = %reason, "Failed to create buggy problem");
        self.skipped.insert(task_id, reason);
    }
}

/// Runs the retry controller over a corpus with bounded concurrency.
pub struct Dispatcher {
    controller: Arc<RetryController>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Creates a dispatcher. A worker count of 0 is treated as 1.
    pub fn new(controller: Arc<RetryController>, mut config: DispatchConfig) -> Self {
        config.max_workers = config.max_workers.max(1);
        Self { controller, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Processes every problem and returns once all of them are done.
    pub async fn run(&self, corpus: &Corpus) -> DispatchReport {
        let total = corpus.len();
        let mut report = DispatchReport::default();
        if total == 0 {
            return report;
        }

        info!(
            problems = total,
            max_workers = self.config.max_workers,
            max_attempts = self.controller.max_attempts(),
            "Dispatching bug injection"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut workers = JoinSet::new();
        let mut task_ids = HashMap::with_capacity(total);

        for (task_id, problem) in corpus {
            let controller = Arc::clone(&self.controller);
            let semaphore = Arc::clone(&semaphore);
            let problem = problem.clone();
            let item_timeout = self.config.item_timeout;

            let handle = workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ItemOutcome::Failed("worker pool closed".to_string());
                };

                match item_timeout {
                    Some(limit) => {
                        match tokio::time::timeout(limit, controller.run(&problem)).await {
                            Ok(outcome) => outcome.into(),
                            Err(_) => ItemOutcome::TimedOut(limit),
                        }
                    }
                    None => controller.run(&problem).await.into(),
                }
            });
            task_ids.insert(handle.id(), task_id.clone());
        }

        while let Some(joined) = workers.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(err) => (err.id(), ItemOutcome::Failed(describe_join_error(err))),
            };

            let Some(task_id) = task_ids.remove(&id) else {
                warn!(task = %id, "Finished worker has no registered problem");
                continue;
            };

            report.record(task_id, outcome);
            info!(
                completed = report.processed(),
                total,
                buggy = report.buggy.len(),
                "Progress"
            );
        }

        report
    }
}

/// Human-readable detail for a worker that did not return normally.
fn describe_join_error(err: JoinError) -> String {
    if err.is_cancelled() {
        return "cancelled".to_string();
    }

    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
