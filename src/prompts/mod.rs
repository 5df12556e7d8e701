//! Prompt templates sent to the language model.

pub mod bug_injection;

pub use bug_injection::build_bug_injection_prompt;
