//! Aggregation and persistence of run results.
//!
//! - [`RunSummary`]: total and buggy counts printed at the end of a run
//! - [`write_result_mapping`]: the buggy problems as an indented JSON file

pub mod json;
pub mod summary;

pub use json::{read_result_mapping, write_result_mapping};
pub use summary::RunSummary;
