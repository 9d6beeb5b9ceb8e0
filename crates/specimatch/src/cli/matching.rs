//! The `specimatch match` command: one candidate against one reference.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use specimatch_core::{CandidateSample, Config, Matcher, ReferenceSample};

use super::types::ProviderKind;

/// Arguments for the `match` command.
///
/// Anything left unset falls back to the `[matcher]` section and the species
/// catalog.
#[derive(Args, Debug, Default)]
pub struct MatchArgs {
    /// Catalog label of the reference species (e.g. "L. annulata")
    #[arg(short, long)]
    pub species: Option<String>,

    /// Reference image, replacing the catalog's image for this species
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Candidate image to identify
    #[arg(short, long)]
    pub candidate: Option<PathBuf>,

    /// Key features in prose, replacing the catalog's description
    #[arg(short, long)]
    pub description: Option<String>,

    /// LLM provider (defaults to llm.provider)
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Model name override
    #[arg(long)]
    pub model: Option<String>,
}

/// Execute the match command.
pub async fn execute(args: MatchArgs, config: Config) -> anyhow::Result<()> {
    let label = args
        .species
        .clone()
        .unwrap_or_else(|| config.matcher.species.clone());
    let mut profile = config.species_by_label(&label).cloned().ok_or_else(|| {
        let known: Vec<&str> = config.species.iter().map(|s| s.label.as_str()).collect();
        anyhow::anyhow!(
            "Unknown species '{label}'. Known species: {}",
            known.join(", ")
        )
    })?;
    if let Some(description) = args.description {
        profile.description = Some(description);
    }

    // Credentials are checked before any file is read or request is sent.
    let provider = args.provider.map(|p| p.to_string());
    let matcher = Matcher::from_config(&config, provider.as_deref(), args.model.as_deref())?;

    let reference_path = args
        .reference
        .or_else(|| config.reference_image_path(&profile));
    let reference = ReferenceSample::load(&profile, reference_path.as_deref(), &config.limits)
        .with_context(|| format!("Failed to load reference for {}", profile.label))?;

    let candidate_path = args.candidate.unwrap_or_else(|| config.candidate_image());
    let candidate = CandidateSample::load(&candidate_path, &config.limits)
        .context("Failed to load candidate image")?;

    tracing::debug!(
        provider = matcher.provider_name(),
        reference = %reference.display_name(),
        candidate = %candidate_path.display(),
        "Running match"
    );

    let result = matcher.verify(&reference, &candidate).await?;

    tracing::info!(
        "Model {} answered in {}ms{}",
        result.model,
        result.latency_ms,
        result
            .tokens_used
            .map(|t| format!(" ({t} tokens)"))
            .unwrap_or_default()
    );
    println!("{}", result.text);

    Ok(())
}
