//! Bug injection: ask a model for a subtly broken variant of a solution.
//!
//! [`BugInjector`] is the seam the retry controller calls. The production
//! implementation, [`LlmBugInjector`], sends one structured-output request
//! per attempt and decodes the answer strictly against [`bug_response_schema`].

pub mod requester;

pub use requester::{
    bug_response_schema, decode_bug_response, BugInjection, BugInjector, LlmBugInjector,
    SamplingConfig, DEFAULT_MODEL,
};
