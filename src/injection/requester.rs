//! Structured-output bug injection requests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::Problem;
use crate::error::GenerationError;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::prompts::build_bug_injection_prompt;

/// Default model for bug injection.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Name the response schema is registered under with the provider.
const SCHEMA_NAME: &str = "bug_response";

/// One candidate bug proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BugInjection {
    /// The model's description of the bug it introduced.
    pub bug_explanation: String,
    /// Function body with the bug, without signature or docstring.
    pub buggy_code: String,
}

/// Produces candidate bugs for a problem.
#[async_trait]
pub trait BugInjector: Send + Sync {
    /// Requests one buggy variant of `problem`'s reference solution.
    async fn inject(&self, problem: &Problem) -> Result<BugInjection, GenerationError>;
}

/// Sampling parameters for bug injection.
///
/// High temperature with a very small nucleus keeps the answers varied
/// between attempts while staying close to the most likely tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 1.2,
            top_p: 0.05,
            max_tokens: 500,
        }
    }
}

/// JSON schema the model's answer must satisfy.
pub fn bug_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "bug_explanation": { "type": "string" },
            "buggy_code": { "type": "string" }
        },
        "required": ["bug_explanation", "buggy_code"],
        "additionalProperties": false
    })
}

/// Decodes a model answer into a [`BugInjection`].
///
/// Anything other than exactly the schema object is rejected. The code
/// itself is not inspected; whether it is a bug is for the oracle to say.
pub fn decode_bug_response(content: &str) -> Result<BugInjection, GenerationError> {
    serde_json::from_str(content.trim()).map_err(|e| GenerationError::Schema(e.to_string()))
}

/// [`BugInjector`] backed by an LLM provider.
pub struct LlmBugInjector {
    provider: Arc<dyn LlmProvider>,
    model: String,
    sampling: SamplingConfig,
}

impl LlmBugInjector {
    /// Creates an injector using `model` with the default sampling config.
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            sampling: SamplingConfig::default(),
        }
    }

    /// Overrides the sampling config.
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Model used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the request sent for `problem`.
    pub fn build_request(&self, problem: &Problem) -> Result<GenerationRequest, GenerationError> {
        if problem.prompt.trim().is_empty() {
            return Err(GenerationError::InvalidProblem {
                task_id: problem.task_id.clone(),
                reason: "prompt is empty".to_string(),
            });
        }
        if problem.canonical_solution.trim().is_empty() {
            return Err(GenerationError::InvalidProblem {
                task_id: problem.task_id.clone(),
                reason: "reference solution is empty".to_string(),
            });
        }

        let prompt = build_bug_injection_prompt(&problem.prompt, &problem.canonical_solution);

        Ok(
            GenerationRequest::new(self.model.clone(), vec![Message::user(prompt)])
                .with_temperature(self.sampling.temperature)
                .with_top_p(self.sampling.top_p)
                .with_max_tokens(self.sampling.max_tokens)
                .with_json_schema(SCHEMA_NAME, bug_response_schema(), true),
        )
    }
}

#[async_trait]
impl BugInjector for LlmBugInjector {
    async fn inject(&self, problem: &Problem) -> Result<BugInjection, GenerationError> {
        let request = self.build_request(problem)?;
        let response = self.provider.generate(request).await?;

        debug!(
            task_id = %problem.task_id,
            model = %response.model,
            completion_tokens = response.usage.completion_tokens,
            "Received bug injection response"
        );

        let content = response
            .first_content()
            .ok_or(GenerationError::EmptyResponse)?;
        decode_bug_response(content)
    }
}
