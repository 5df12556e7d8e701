//! Generate-validate-retry pipeline.
//!
//! # Architecture
//!
//! - **RetryController**: for one problem, asks the injector for a buggy
//!   candidate and checks it with the validator, up to `max_attempts` times
//!   in sequence. The first candidate the tests reject is accepted.
//! - **Dispatcher**: spawns one retry loop per problem behind a semaphore of
//!   `max_workers` permits and collects the outcomes as they complete.
//! - **Config**: budget, pool size, deadlines and oracle settings.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bug_forge::pipeline::{DispatchConfig, Dispatcher, RetryController};
//!
//! let controller = RetryController::new(injector, validator).with_max_attempts(3);
//! let dispatcher = Dispatcher::new(Arc::new(controller), DispatchConfig::default());
//! let report = dispatcher.run(&corpus).await;
//!
//! println!("{} of {} problems now carry a bug", report.buggy.len(), corpus.len());
//! ```
//!
//! # Outcomes
//!
//! | Per-item result                        | Effect on the run                 |
//! |----------------------------------------|-----------------------------------|
//! | candidate fails the tests              | inserted into the result mapping  |
//! | generation / validation error          | attempt consumed, loop continues  |
//! | budget exhausted                       | item skipped, logged              |
//! | worker panic / per-item deadline       | item skipped, logged              |

pub mod config;
pub mod dispatcher;
pub mod retry;
pub mod types;

pub use config::{ConfigError, PipelineConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_WORKERS};
pub use dispatcher::{DispatchConfig, DispatchReport, Dispatcher, ItemOutcome, SkipReason};
pub use retry::{AttemptError, InjectionOutcome, RetryController};
pub use types::{BuggyProblem, ResultMapping};
