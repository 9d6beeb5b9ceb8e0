//! The `specimatch evaluate` command: every reference against every labelled
//! test image, with a report and an accuracy summary.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use specimatch_core::evaluation;
use specimatch_core::{
    Config, EvaluationRecord, EvaluationSummary, Evaluator, Matcher, OutputFormat, ReportWriter,
};

use super::types::{ProviderKind, ReportFormat};

/// Arguments for the `evaluate` command.
#[derive(Args, Debug, Default)]
pub struct EvaluateArgs {
    /// Directory holding the reference images (defaults to evaluation.reference_dir)
    #[arg(long)]
    pub reference_dir: Option<PathBuf>,

    /// Directory with one sub-directory of test images per species label
    #[arg(long)]
    pub test_dir: Option<PathBuf>,

    /// Only evaluate this reference species
    #[arg(long, value_name = "LABEL")]
    pub only: Option<String>,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (defaults to output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// LLM provider (defaults to llm.provider)
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Model name override
    #[arg(long)]
    pub model: Option<String>,

    /// List the planned comparisons without calling the model
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the evaluate command.
pub async fn execute(args: EvaluateArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(dir) = args.reference_dir {
        config.evaluation.reference_dir = dir;
    }
    if let Some(dir) = args.test_dir {
        config.evaluation.test_dir = dir;
    }
    if let Some(only) = &args.only {
        if config.species_by_label(only).is_none() {
            anyhow::bail!("Unknown species '{only}'");
        }
    }

    let tasks = evaluation::plan(&config, args.only.as_deref());
    if tasks.is_empty() {
        anyhow::bail!(
            "No test images found under {}",
            config.test_dir().display()
        );
    }
    tracing::info!("Planned {} comparisons", tasks.len());

    if args.dry_run {
        for task in &tasks {
            println!(
                "{}\t{}\t{}",
                config.species[task.reference].label,
                task.species,
                task.query_image.display()
            );
        }
        return Ok(());
    }

    let provider = args.provider.map(|p| p.to_string());
    let matcher = Matcher::from_config(&config, provider.as_deref(), args.model.as_deref())?;
    let evaluator = Evaluator::new(&config, &matcher);
    tracing::info!("Using {}", matcher.provider_name());

    let format = resolve_format(args.format, &config);
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer: ReportWriter<_, EvaluationRecord> =
        ReportWriter::new(sink, format, config.output.pretty);

    let progress = create_progress_bar(tasks.len() as u64);
    let start = Instant::now();

    // The callback can't return errors; keep the first one and stop writing.
    let mut write_error: Option<io::Error> = None;
    let summary = evaluator
        .run(&tasks, |record| {
            progress.set_message(record.query_image.clone());
            progress.inc(1);
            if write_error.is_none() {
                if let Err(e) = writer.push(record.clone()) {
                    write_error = Some(e);
                }
            }
        })
        .await;
    progress.finish_and_clear();

    if let Some(e) = write_error {
        return Err(anyhow::anyhow!("Failed to write report: {e}"));
    }
    let written = writer.finish()?;
    if let Some(path) = &args.output {
        tracing::info!("Wrote {written} records to {}", path.display());
    }

    print_summary(&summary, start.elapsed());

    if summary.succeeded == 0 {
        anyhow::bail!("Every comparison failed");
    }
    Ok(())
}

fn resolve_format(requested: Option<ReportFormat>, config: &Config) -> OutputFormat {
    match requested {
        Some(format) => format.into(),
        None => OutputFormat::parse(&config.output.format).unwrap_or(OutputFormat::JsonLines),
    }
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-");

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Share of answered comparisons whose verdict agrees with the directory label.
fn accuracy(summary: &EvaluationSummary) -> f64 {
    if summary.succeeded == 0 {
        0.0
    } else {
        summary.correct as f64 / summary.succeeded as f64 * 100.0
    }
}

/// Print a formatted summary table after the sweep.
fn print_summary(summary: &EvaluationSummary, elapsed: std::time::Duration) {
    let total = summary.succeeded + summary.failed;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Match:        {:>8}", summary.matches);
    eprintln!("    No match:     {:>8}", summary.no_matches);
    if summary.unclear > 0 {
        eprintln!("    Unclear:      {:>8}", summary.unclear);
    }
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Correct:      {:>8}", summary.correct);
    eprintln!("    Accuracy:     {:>7.1}%", accuracy(summary));
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_falls_back_to_config() {
        let mut config = Config::default();
        config.output.format = "json".to_string();
        assert_eq!(resolve_format(None, &config), OutputFormat::Json);
        assert_eq!(
            resolve_format(Some(ReportFormat::Jsonl), &config),
            OutputFormat::JsonLines
        );

        config.output.format = "csv".to_string();
        assert_eq!(resolve_format(None, &config), OutputFormat::JsonLines);
    }

    #[test]
    fn test_accuracy() {
        let summary = EvaluationSummary {
            succeeded: 4,
            failed: 2,
            correct: 3,
            ..Default::default()
        };
        assert!((accuracy(&summary) - 75.0).abs() < f64::EPSILON);
        assert_eq!(accuracy(&EvaluationSummary::default()), 0.0);
    }

    #[tokio::test]
    async fn test_dry_run_without_test_images_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();

        let args = EvaluateArgs {
            test_dir: Some(dir.path().to_path_buf()),
            dry_run: true,
            ..EvaluateArgs::default()
        };
        let err = execute(args, config).await.unwrap_err();
        assert!(err.to_string().contains("No test images"));
    }

    #[tokio::test]
    async fn test_dry_run_needs_no_credential() {
        let dir = tempfile::tempdir().unwrap();
        let species_dir = dir.path().join("L. ornata");
        std::fs::create_dir_all(&species_dir).unwrap();
        std::fs::write(species_dir.join("o1.jpg"), [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let mut config = Config::default();
        config.llm.provider = "openai".to_string();
        config.llm.openai.api_key = "${SPECIMATCH_TEST_UNSET_KEY}".to_string();

        let args = EvaluateArgs {
            test_dir: Some(dir.path().to_path_buf()),
            only: Some("L. ornata".to_string()),
            dry_run: true,
            ..EvaluateArgs::default()
        };
        execute(args, config).await.unwrap();
    }
}
