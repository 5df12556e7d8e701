//! Problem corpus: the reference solutions bugs are injected into.
//!
//! Problems are read once, before dispatch, from a HumanEval-style JSONL
//! file (optionally gzip-compressed) and keyed by `task_id`.

pub mod loader;
pub mod problem;

pub use loader::{load_problems, parse_problems};
pub use problem::{Corpus, Problem};
