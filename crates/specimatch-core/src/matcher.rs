//! The single verification call.
//!
//! One reference, one candidate, one request. There is no retry: a provider
//! error or timeout goes straight back to the caller.

use std::time::Duration;

use crate::config::Config;
use crate::error::{ProviderError, Result, SpecimatchError};
use crate::llm::{ImageInput, LlmProvider, LlmProviderFactory, LlmRequest};
use crate::prompt::build_prompt;
use crate::sample::{CandidateSample, ReferenceSample};
use crate::verdict::Verdict;

/// Sampling settings passed with each request.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// The model's answer for one reference/candidate pair.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The model's free-text verdict, as returned
    pub text: String,
    pub model: String,
    pub tokens_used: Option<u32>,
    pub latency_ms: u64,
}

impl MatchResult {
    /// Keyword reading of the answer; see [`Verdict::parse`].
    pub fn verdict(&self) -> Verdict {
        Verdict::parse(&self.text)
    }
}

/// Compares candidates against references through one provider.
pub struct Matcher {
    provider: Box<dyn LlmProvider>,
    options: MatchOptions,
}

impl Matcher {
    pub fn new(provider: Box<dyn LlmProvider>, options: MatchOptions) -> Self {
        Self { provider, options }
    }

    /// Build a matcher from configuration.
    ///
    /// Fails with a missing-credential error before anything touches the
    /// network.
    pub fn from_config(
        config: &Config,
        provider: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let name = provider.unwrap_or(&config.llm.provider);
        let section = config
            .llm
            .provider(name)
            .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))?;
        let provider = LlmProviderFactory::create(
            name,
            &config.llm,
            model_override,
            Duration::from_millis(config.limits.request_timeout_ms),
        )?;
        Ok(Self::new(
            provider,
            MatchOptions {
                max_tokens: section.max_tokens,
                temperature: section.temperature,
            },
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Assemble the request: reference image (if any), candidate image, prompt.
    pub fn build_request(
        &self,
        reference: &ReferenceSample,
        candidate: &CandidateSample,
    ) -> LlmRequest {
        let mut images = Vec::with_capacity(2);
        if let Some(image) = &reference.image {
            images.push(ImageInput::from_sample(image));
        }
        images.push(ImageInput::from_sample(&candidate.image));

        LlmRequest {
            images,
            prompt: build_prompt(reference),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        }
    }

    /// Ask the model whether `candidate` is the reference's species.
    pub async fn verify(
        &self,
        reference: &ReferenceSample,
        candidate: &CandidateSample,
    ) -> Result<MatchResult> {
        let request = self.build_request(reference, candidate);
        let timeout = self.provider.timeout();

        tracing::info!(
            "Sending {} vs {} to {} for analysis...",
            candidate.image.file_name(),
            reference.display_name(),
            self.provider.name()
        );

        let response = tokio::time::timeout(timeout, self.provider.generate(&request))
            .await
            .map_err(|_| ProviderError::Timeout {
                provider: self.provider.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(SpecimatchError::from)?;

        tracing::debug!(
            "{} answered in {}ms ({} tokens)",
            response.model,
            response.latency_ms,
            response
                .tokens_used
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string())
        );

        Ok(MatchResult {
            text: response.text,
            model: response.model,
            tokens_used: response.tokens_used,
            latency_ms: response.latency_ms,
        })
    }
}
