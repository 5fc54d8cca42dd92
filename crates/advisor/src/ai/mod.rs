//! LLM provider integration.
//!
//! This module provides:
//! - Provider abstraction (Anthropic, OpenAI)
//! - Prompt template system with Handlebars
//! - Provider registry for dependency-injected provider lookup

pub mod prompts;
pub mod provider;
pub mod registry;

// Provider implementations
pub mod anthropic;
pub mod openai;

// Re-exports
pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use prompts::{PromptTemplate, RenderedPrompt};
pub use provider::{GenerateOptions, LlmError, LlmProvider, LlmResponse, TokenUsage};
pub use registry::ProviderRegistry;
