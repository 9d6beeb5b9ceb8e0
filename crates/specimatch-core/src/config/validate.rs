//! Configuration validation with range checks.

use std::collections::HashSet;

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.llm.provider(&self.llm.provider).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "llm.provider must be one of gemini, anthropic, openai (got '{}')",
                self.llm.provider
            )));
        }
        for (name, section) in [
            ("gemini", &self.llm.gemini),
            ("anthropic", &self.llm.anthropic),
            ("openai", &self.llm.openai),
        ] {
            if !(0.0..=2.0).contains(&section.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "llm.{name}.temperature must be between 0.0 and 2.0"
                )));
            }
            if section.max_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "llm.{name}.max_tokens must be > 0"
                )));
            }
        }
        if self.species.is_empty() {
            return Err(ConfigError::ValidationError(
                "species catalog must contain at least one entry".into(),
            ));
        }
        let mut labels = HashSet::new();
        for profile in &self.species {
            if profile.label.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "species.label must not be empty".into(),
                ));
            }
            if !labels.insert(profile.label.to_lowercase()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate species label '{}'",
                    profile.label
                )));
            }
            let has_description = profile
                .description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty());
            if profile.reference_image.is_none() && !has_description {
                return Err(ConfigError::ValidationError(format!(
                    "species '{}' needs a reference_image or a description",
                    profile.label
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_file_size() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "ollama".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ollama"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.llm.openai.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.openai.temperature"));
    }

    #[test]
    fn test_validate_rejects_empty_catalog() {
        let mut config = Config::default();
        config.species.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("species catalog"));
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let mut config = Config::default();
        let dup = config.species[0].clone();
        config.species.push(dup);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate species label"));
    }

    #[test]
    fn test_validate_rejects_empty_reference() {
        let mut config = Config::default();
        config.species[1].reference_image = None;
        config.species[1].description = Some("   ".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("L. approximans"));
    }
}
