//! Error types for species verification.
//!
//! Errors are grouped by where a run can fail: configuration and credentials,
//! loading the two samples, and the remote inference call. None of them are
//! retried; they propagate to the caller with the offending path or status.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Specimatch operations.
#[derive(Error, Debug)]
pub enum SpecimatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reference or candidate sample could not be loaded
    #[error("Sample error: {0}")]
    Sample(#[from] SampleError),

    /// Inference provider failures
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No credential was found for the selected provider
    #[error(
        "{provider} API key not set. Set the {env_var} environment variable \
         or llm.{provider}.api_key in the config file."
    )]
    MissingApiKey { provider: String, env_var: String },
}

/// Errors raised while loading a reference or candidate sample.
#[derive(Error, Debug)]
pub enum SampleError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exists but could not be read
    #[error("Cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Content is not an image format the providers accept
    #[error("Unsupported image format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// A reference needs at least an image or a description
    #[error("Reference for {species} has neither an image nor a description")]
    EmptyReference { species: String },
}

/// Errors from the remote inference call.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport failure or non-success HTTP status
    #[error("{message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    /// The request did not complete in time
    #[error("{provider} request timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    /// The provider answered but produced no text
    #[error("{provider} returned an empty response{}", reason_suffix(.reason))]
    EmptyResponse {
        provider: String,
        reason: Option<String>,
    },

    /// Provider name not recognized
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" ({r})"),
        None => String::new(),
    }
}

/// Convenience type alias for Specimatch results.
pub type Result<T> = std::result::Result<T, SpecimatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_names_path() {
        let err = SpecimatchError::from(SampleError::FileNotFound(PathBuf::from(
            "data/test/missing.png",
        )));
        assert!(err.to_string().contains("data/test/missing.png"));
    }

    #[test]
    fn test_missing_api_key_mentions_env_var() {
        let err = ConfigError::MissingApiKey {
            provider: "gemini".to_string(),
            env_var: "GEMINI_API_KEY".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GEMINI_API_KEY"));
        assert!(msg.contains("llm.gemini.api_key"));
    }

    #[test]
    fn test_empty_response_reason() {
        let err = ProviderError::EmptyResponse {
            provider: "gemini".to_string(),
            reason: Some("SAFETY".to_string()),
        };
        assert_eq!(err.to_string(), "gemini returned an empty response (SAFETY)");

        let err = ProviderError::EmptyResponse {
            provider: "openai".to_string(),
            reason: None,
        };
        assert_eq!(err.to_string(), "openai returned an empty response");
    }
}
