//! Configuration management for Specimatch.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with defaults for everything, including the built-in species catalog.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Specimatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Single-match defaults
    pub matcher: MatcherConfig,

    /// Evaluation sweep layout
    pub evaluation: EvaluationConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Report output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Species catalog
    pub species: Vec<SpeciesProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            evaluation: EvaluationConfig::default(),
            limits: LimitsConfig::default(),
            llm: LlmConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            species: default_species(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.specimatch.specimatch/config.toml
    /// - Linux: ~/.config/specimatch/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\specimatch\config\config.toml
    ///
    /// Falls back to ~/.specimatch/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "specimatch", "specimatch")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".specimatch").join("config.toml")
            })
    }

    /// Find a catalog entry by label (case-insensitive).
    pub fn species_by_label(&self, label: &str) -> Option<&SpeciesProfile> {
        self.species
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(label.trim()))
    }

    /// Resolve a profile's reference image against `evaluation.reference_dir`.
    pub fn reference_image_path(&self, profile: &SpeciesProfile) -> Option<PathBuf> {
        profile.reference_image.as_ref().map(|image| {
            let image = expand_path(image);
            if image.is_absolute() {
                image
            } else {
                self.reference_dir().join(image)
            }
        })
    }

    /// Get the resolved reference directory (with ~ expansion).
    pub fn reference_dir(&self) -> PathBuf {
        expand_path(&self.evaluation.reference_dir)
    }

    /// Get the resolved test directory (with ~ expansion).
    pub fn test_dir(&self) -> PathBuf {
        expand_path(&self.evaluation.test_dir)
    }

    /// Get the resolved default candidate image (with ~ expansion).
    pub fn candidate_image(&self) -> PathBuf {
        expand_path(&self.matcher.candidate_image)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
