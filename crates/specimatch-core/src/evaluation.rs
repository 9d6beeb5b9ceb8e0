//! Evaluation sweep: every reference against every labelled test image.
//!
//! Runs sequentially, one request at a time. A failure on one pair is
//! recorded and the sweep moves on; records are handed to a callback as they
//! complete so the caller can stream them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{Config, SpeciesProfile};
use crate::discovery::FileDiscovery;
use crate::matcher::Matcher;
use crate::sample::{CandidateSample, ReferenceSample};
use crate::verdict::Verdict;

/// One row of the evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Reference image file name (or label for text-only references)
    pub reference: String,
    /// Label of the directory the query image came from
    pub species: String,
    /// Query image file name
    pub query_image: String,
    /// `None` when the answer was unclear or the pair failed
    pub is_match: Option<bool>,
    pub explanation: String,
    pub full_result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationRecord {
    /// The record's ground truth: does the query's species equal the reference's?
    pub fn is_same_species(&self, reference_label: &str) -> bool {
        self.species.eq_ignore_ascii_case(reference_label)
    }
}

/// One planned comparison.
#[derive(Debug, Clone)]
pub struct EvaluationTask {
    /// Index into the catalog
    pub reference: usize,
    /// Label of the species directory
    pub species: String,
    pub query_image: PathBuf,
}

/// Counts over a finished sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub matches: usize,
    pub no_matches: usize,
    pub unclear: usize,
    /// Verdicts that agree with the directory label
    pub correct: usize,
}

impl EvaluationSummary {
    fn record(&mut self, record: &EvaluationRecord, reference_label: &str) {
        if record.error.is_some() {
            self.failed += 1;
            return;
        }
        self.succeeded += 1;
        if record.is_match == Some(record.is_same_species(reference_label)) {
            self.correct += 1;
        }
        match record.is_match {
            Some(true) => self.matches += 1,
            Some(false) => self.no_matches += 1,
            None => self.unclear += 1,
        }
    }
}

/// Catalog entries to sweep, optionally narrowed to one label.
pub fn references<'a>(
    config: &'a Config,
    only: Option<&str>,
) -> Vec<(usize, &'a SpeciesProfile)> {
    config
        .species
        .iter()
        .enumerate()
        .filter(|(_, s)| only.map_or(true, |label| s.label.eq_ignore_ascii_case(label.trim())))
        .collect()
}

/// Discover every (reference, test image) pair.
///
/// Test images live in `{test_dir}/{label}/`; a missing species
/// directory is skipped with a warning. Needs no provider credentials.
pub fn plan(config: &Config, only: Option<&str>) -> Vec<EvaluationTask> {
    let discovery = FileDiscovery::new(&config.evaluation);
    let test_dir = config.test_dir();

    let mut per_species = Vec::new();
    for species in &config.species {
        let dir = test_dir.join(&species.label);
        if !dir.is_dir() {
            tracing::warn!("No test directory for {} at {}", species.label, dir.display());
            continue;
        }
        per_species.push((species.label.clone(), discovery.discover(&dir)));
    }

    let mut tasks = Vec::new();
    for (index, _) in references(config, only) {
        for (label, images) in &per_species {
            tasks.extend(images.iter().map(|image| EvaluationTask {
                reference: index,
                species: label.clone(),
                query_image: image.clone(),
            }));
        }
    }
    tasks
}

/// Drives the sweep for a catalog.
pub struct Evaluator<'a> {
    config: &'a Config,
    matcher: &'a Matcher,
}

impl<'a> Evaluator<'a> {
    pub fn new(config: &'a Config, matcher: &'a Matcher) -> Self {
        Self { config, matcher }
    }

    /// Run the planned tasks in order, calling `on_record` after each one.
    pub async fn run<F>(&self, tasks: &[EvaluationTask], mut on_record: F) -> EvaluationSummary
    where
        F: FnMut(&EvaluationRecord),
    {
        let mut summary = EvaluationSummary::default();
        let mut loaded: Option<(usize, Result<ReferenceSample, String>)> = None;

        for task in tasks {
            let profile = &self.config.species[task.reference];

            // tasks are grouped by reference, so each reference is read once
            if loaded.as_ref().map(|(i, _)| *i) != Some(task.reference) {
                loaded = Some((task.reference, self.load_reference(profile)));
            }
            let reference = match &loaded {
                Some((_, reference)) => reference,
                None => continue,
            };

            let record = match reference {
                Ok(reference) => self.evaluate_one(reference, task).await,
                Err(message) => failure_record(
                    reference_name(self.config, profile),
                    task,
                    message.clone(),
                ),
            };

            summary.record(&record, &profile.label);
            on_record(&record);
        }

        summary
    }

    fn load_reference(&self, profile: &SpeciesProfile) -> Result<ReferenceSample, String> {
        let image_path = self.config.reference_image_path(profile);
        ReferenceSample::load(profile, image_path.as_deref(), &self.config.limits).map_err(|e| {
            tracing::error!("Cannot load reference for {}: {e}", profile.label);
            e.to_string()
        })
    }

    async fn evaluate_one(
        &self,
        reference: &ReferenceSample,
        task: &EvaluationTask,
    ) -> EvaluationRecord {
        let candidate = match CandidateSample::load(&task.query_image, &self.config.limits) {
            Ok(candidate) => candidate,
            Err(e) => return failure_record(reference.display_name(), task, e.to_string()),
        };

        match self.matcher.verify(reference, &candidate).await {
            Ok(result) => EvaluationRecord {
                reference: reference.display_name(),
                species: task.species.clone(),
                query_image: candidate.image.file_name(),
                is_match: Verdict::parse(&result.text).is_match(),
                explanation: extract_explanation(&result.text),
                full_result: result.text,
                error: None,
            },
            Err(e) => {
                tracing::warn!("{}: {e}", task.query_image.display());
                failure_record(reference.display_name(), task, e.to_string())
            }
        }
    }
}

fn reference_name(config: &Config, profile: &SpeciesProfile) -> String {
    config
        .reference_image_path(profile)
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| profile.label.clone())
}

fn failure_record(reference: String, task: &EvaluationTask, message: String) -> EvaluationRecord {
    EvaluationRecord {
        reference,
        species: task.species.clone(),
        query_image: task
            .query_image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        is_match: None,
        explanation: format!("Error: {message}"),
        full_result: format!("Error: {message}"),
        error: Some(message),
    }
}

/// Justification part of an answer.
///
/// Models usually lead with a verdict line ("**MATCH**", "Verdict: NO
/// MATCH"); when that line is followed by more text, the rest is the
/// explanation. Otherwise the whole answer is.
pub fn extract_explanation(text: &str) -> String {
    let text = text.trim();
    let Some((first, rest)) = text.split_once('\n') else {
        return text.to_string();
    };
    let rest = rest.trim();
    if first.to_lowercase().contains("match") && first.len() <= 80 && !rest.is_empty() {
        rest.to_string()
    } else {
        text.to_string()
    }
}
