//! LLM provider trait and request/response types.
//!
//! Defines the interface that all LLM providers implement, plus the
//! factory that creates the right provider from CLI flags and config.

use crate::config::{LlmConfig, ProviderConfig};
use crate::error::{ConfigError, ProviderError, SpecimatchError};
use crate::sample::ImageSample;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    pub fn from_sample(sample: &ImageSample) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(&sample.bytes),
            media_type: sample.format.media_type().to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A multimodal request: images in order, followed by the prompt.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Images, in the order the prompt refers to them
    pub images: Vec<ImageInput>,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "anthropic").
    fn name(&self) -> &str;

    /// Send one request and return the generated text.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Environment variable that carries the key for a provider.
pub fn api_key_env_var(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_uppercase())
}

/// Resolve a provider's API key.
///
/// The provider's environment variable wins when set and non-empty; otherwise
/// the config value is used (with `${ENV_VAR}` expansion).
pub fn resolve_api_key(provider: &str, config_value: &str) -> Result<String, ConfigError> {
    let env_var = api_key_env_var(provider);
    std::env::var(&env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| resolve_env_var(config_value))
        .map(|key| key.trim().to_string())
        .ok_or_else(|| ConfigError::MissingApiKey {
            provider: provider.to_string(),
            env_var,
        })
}

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider based on provider name, config, and optional model override.
    ///
    /// The credential is resolved here, so a missing key fails before any
    /// network I/O.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("gemini", "anthropic", "openai")
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    /// * `timeout` - Per-request timeout
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>, SpecimatchError> {
        let cfg = config
            .provider(provider)
            .ok_or_else(|| ProviderError::UnknownProvider(provider.to_string()))?;
        let api_key = resolve_api_key(provider, &cfg.api_key)?;
        let cfg = ProviderConfig {
            model: model_override.map(String::from).unwrap_or(cfg.model),
            ..cfg
        };

        tracing::debug!("Using {provider} model {} at {}", cfg.model, cfg.endpoint);

        let provider: Box<dyn LlmProvider> = match provider {
            "gemini" => Box::new(super::gemini::GeminiProvider::new(&cfg, &api_key, timeout)),
            "anthropic" => Box::new(super::anthropic::AnthropicProvider::new(
                &cfg, &api_key, timeout,
            )),
            "openai" => Box::new(super::openai::OpenAiProvider::new(&cfg, &api_key, timeout)),
            other => return Err(ProviderError::UnknownProvider(other.to_string()).into()),
        };
        Ok(provider)
    }
}
