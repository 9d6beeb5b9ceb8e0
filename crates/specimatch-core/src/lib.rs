//! Specimatch Core - species verification against reference samples.
//!
//! Sends a candidate image together with a reference image and/or a textual
//! species description to a hosted multimodal model, and returns the model's
//! free-text judgement on whether they depict the same species.
//!
//! # Architecture
//!
//! ```text
//! Reference + Candidate → Prompt → Provider (one request) → MatchResult
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use specimatch_core::{CandidateSample, Config, Matcher, ReferenceSample};
//!
//! #[tokio::main]
//! async fn main() -> specimatch_core::Result<()> {
//!     let config = Config::load()?;
//!     let matcher = Matcher::from_config(&config, None, None)?;
//!
//!     let profile = config.species_by_label("L. annulata").unwrap();
//!     let image = config.reference_image_path(profile);
//!     let reference = ReferenceSample::load(profile, image.as_deref(), &config.limits)?;
//!     let candidate = CandidateSample::load("snake.jpg".as_ref(), &config.limits)?;
//!
//!     let result = matcher.verify(&reference, &candidate).await?;
//!     println!("{}", result.text);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod discovery;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod matcher;
pub mod output;
pub mod prompt;
pub mod sample;
pub mod verdict;

// Re-exports for convenient access
pub use config::{Config, SpeciesProfile};
pub use error::{ConfigError, ProviderError, Result, SampleError, SpecimatchError};
pub use evaluation::{EvaluationRecord, EvaluationSummary, EvaluationTask, Evaluator};
pub use matcher::{MatchOptions, MatchResult, Matcher};
pub use output::{OutputFormat, ReportWriter};
pub use sample::{CandidateSample, ImageFormat, ImageSample, ReferenceSample};
pub use verdict::Verdict;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
