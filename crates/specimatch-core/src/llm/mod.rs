//! LLM integration for species verification.
//!
//! Provides a provider abstraction over hosted multimodal backends (Gemini,
//! Anthropic, OpenAI). Every backend receives the same request shape: images
//! in order, then the prompt.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod openai;
pub(crate) mod provider;

pub use provider::{
    api_key_env_var, resolve_api_key, ImageInput, LlmProvider, LlmProviderFactory, LlmRequest,
    LlmResponse,
};

/// Provider names accepted by the factory.
pub const PROVIDERS: &[&str] = &["gemini", "anthropic", "openai"];
