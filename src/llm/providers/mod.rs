//! LLM provider implementations.
//!
//! Hosted providers that implement [`LlmProvider`] on top of the shared
//! chat-completions wire types.

pub mod openrouter;

pub use openrouter::OpenRouterProvider;

pub use super::litellm::LlmProvider;
