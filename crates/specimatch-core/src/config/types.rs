//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Defaults for a single `specimatch match` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Catalog label of the reference used when none is given
    pub species: String,

    /// Candidate image used when none is given
    pub candidate_image: PathBuf,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            species: "L. annulata".to_string(),
            candidate_image: PathBuf::from("data/candidate.png"),
        }
    }
}

/// A catalog entry: one target species with its reference material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    /// Short label, also the name of the species' test directory
    pub label: String,

    /// Full binomial name used in the prompt
    pub scientific_name: String,

    /// Reference image file name, resolved against `evaluation.reference_dir`
    /// unless absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<PathBuf>,

    /// Key diagnostic features in prose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SpeciesProfile {
    fn leptodeira(label: &str, epithet: &str, description: &str) -> Self {
        Self {
            label: label.to_string(),
            scientific_name: format!("Leptodeira {epithet}"),
            reference_image: Some(PathBuf::from(format!("{label}_reference.PNG"))),
            description: Some(description.to_string()),
        }
    }
}

/// The built-in catalog of cat-eyed snakes.
pub fn default_species() -> Vec<SpeciesProfile> {
    vec![
        SpeciesProfile::leptodeira(
            "L. annulata",
            "annulata",
            "First dorsal blotch with half-moon shape generally fused with other dorsal \
             blotches in the first third of body forming a zigzag pattern.",
        ),
        SpeciesProfile::leptodeira(
            "L. approximans",
            "approximans",
            "first dorsal blotches of the body with a half-moon shape, generally fused with \
             other dorsal blotches in the first third of body forming a zig-zag pattern",
        ),
        SpeciesProfile::leptodeira(
            "L. ashmeadii",
            "ashmeadii",
            "two dark brown parallel stripes in the parietal region which run toward the \
             occipitals; two occipital stripes extend to the body and fuse with the first \
             dorsal blotch",
        ),
        SpeciesProfile::leptodeira(
            "L. ornata",
            "ornata",
            "occipital region light brown with medial wide line",
        ),
    ]
}

/// Directory layout for the evaluation sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Directory holding the reference images
    pub reference_dir: PathBuf,

    /// Directory with one sub-directory of test images per species label
    pub test_dir: PathBuf,

    /// Image extensions picked up from the test directories
    pub supported_formats: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("data/reference"),
            test_dir: PathBuf::from("data/test"),
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
            ],
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum sample file size in megabytes
    pub max_file_size_mb: u64,

    /// Inference request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            request_timeout_ms: 120_000,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default report format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jsonl".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used when none is given on the command line
    pub provider: String,

    /// Google Gemini configuration
    pub gemini: ProviderConfig,

    /// Anthropic configuration
    pub anthropic: ProviderConfig,

    /// OpenAI configuration
    pub openai: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: ProviderConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key: "${GEMINI_API_KEY}".to_string(),
                model: "gemini-2.5-flash".to_string(),
                // thinking tokens count against the output budget
                max_tokens: 8192,
                ..ProviderConfig::default()
            },
            anthropic: ProviderConfig {
                endpoint: "https://api.anthropic.com/v1".to_string(),
                api_key: "${ANTHROPIC_API_KEY}".to_string(),
                model: "claude-sonnet-4-20250514".to_string(),
                ..ProviderConfig::default()
            },
            openai: ProviderConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: "${OPENAI_API_KEY}".to_string(),
                model: "gpt-4o".to_string(),
                ..ProviderConfig::default()
            },
        }
    }
}

impl LlmConfig {
    /// Look up a provider section by name.
    ///
    /// Fields left blank in the config file fall back to the built-in values,
    /// so a `[llm.gemini]` table that only sets `model` keeps the default
    /// endpoint and key reference.
    pub fn provider(&self, name: &str) -> Option<ProviderConfig> {
        let defaults = Self::default();
        let (section, fallback) = match name {
            "gemini" => (&self.gemini, defaults.gemini),
            "anthropic" => (&self.anthropic, defaults.anthropic),
            "openai" => (&self.openai, defaults.openai),
            _ => return None,
        };
        Some(section.clone().or(fallback))
    }
}

/// Connection and sampling settings for one hosted provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: String::new(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl ProviderConfig {
    fn or(mut self, fallback: ProviderConfig) -> Self {
        if self.endpoint.trim().is_empty() {
            self.endpoint = fallback.endpoint;
        }
        if self.api_key.trim().is_empty() {
            self.api_key = fallback.api_key;
        }
        if self.model.trim().is_empty() {
            self.model = fallback.model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let species = default_species();
        assert_eq!(species.len(), 4);
        assert_eq!(species[0].label, "L. annulata");
        assert_eq!(species[0].scientific_name, "Leptodeira annulata");
        assert_eq!(
            species[3].reference_image,
            Some(PathBuf::from("L. ornata_reference.PNG"))
        );
    }

    #[test]
    fn test_provider_lookup() {
        let llm = LlmConfig::default();
        assert_eq!(llm.provider("gemini").unwrap().model, "gemini-2.5-flash");
        assert_eq!(
            llm.provider("anthropic").unwrap().api_key,
            "${ANTHROPIC_API_KEY}"
        );
        assert!(llm.provider("ollama").is_none());
    }

    #[test]
    fn test_partial_provider_section_keeps_defaults() {
        let mut llm = LlmConfig::default();
        llm.gemini = ProviderConfig {
            model: "gemini-2.5-pro".to_string(),
            ..ProviderConfig::default()
        };

        let gemini = llm.provider("gemini").unwrap();
        assert_eq!(gemini.model, "gemini-2.5-pro");
        assert_eq!(
            gemini.endpoint,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(gemini.api_key, "${GEMINI_API_KEY}");
    }
}
