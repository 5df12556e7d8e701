//! Error types for bug-forge operations.
//!
//! Defines the error types for every subsystem:
//! - LLM API interactions
//! - Bug generation (prompting and structured decoding)
//! - Candidate validation against the correctness oracle
//! - Corpus loading
//! - Dataset export

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: LITELLM_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },
}

/// Errors raised while asking the model for a buggy candidate.
///
/// Every variant is recoverable at the retry controller: it consumes one
/// attempt and the loop moves on.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Problem '{task_id}' cannot be used for bug injection: {reason}")]
    InvalidProblem { task_id: String, reason: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM response contained no content")]
    EmptyResponse,

    #[error("Response does not match the bug schema: {0}")]
    Schema(String),
}

/// Errors raised when the correctness oracle itself cannot be run.
///
/// A candidate failing its tests is a verdict, not a `ValidationError`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Failed to prepare oracle workspace: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("Failed to spawn interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to collect oracle output: {0}")]
    Wait(#[source] std::io::Error),
}

/// Errors that can occur while loading the problem corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid problem on line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate task id '{0}' in corpus")]
    DuplicateTask(String),
}

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Filesystem error: {0}")]
    FilesystemError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
