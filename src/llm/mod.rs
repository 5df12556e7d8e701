//! LLM integration for bug-forge.
//!
//! Every generation goes through the [`LlmProvider`] trait so the pipeline
//! can be driven by a LiteLLM proxy, OpenRouter, or a test stub.
//!
//! ```ignore
//! use bug_forge::llm::{GenerationRequest, LiteLlmClient, LlmProvider, Message};
//!
//! let client = LiteLlmClient::from_env()?;
//! let request = GenerationRequest::new("gpt-4o-mini", vec![Message::user("Hello!")])
//!     .with_temperature(0.2);
//! let response = client.generate(request).await?;
//! println!("{}", response.first_content().unwrap_or_default());
//! ```

pub mod litellm;
pub mod providers;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
};
pub use providers::OpenRouterProvider;
