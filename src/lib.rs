//! bug-forge: buggy-solution dataset generator.
//!
//! Takes a corpus of programming problems with reference solutions, asks a
//! language model to plant a subtle bug in each solution, and keeps a
//! candidate only when the problem's own tests reject it. The result is a
//! dataset for evaluating bug detection and program repair.

pub mod cli;
pub mod corpus;
pub mod error;
pub mod export;
pub mod injection;
pub mod llm;
pub mod oracle;
pub mod pipeline;
pub mod prompts;

// Re-export commonly used error types
pub use error::{CorpusError, ExportError, GenerationError, LlmError, ValidationError};
