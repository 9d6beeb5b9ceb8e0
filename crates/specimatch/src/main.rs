//! Specimatch CLI - ask a hosted multimodal model whether a photo shows the
//! same species as a reference image and description.
//!
//! # Usage
//!
//! ```bash
//! # Compare the configured default candidate against the default reference
//! specimatch
//!
//! # Compare a specific photo against one catalog species
//! specimatch match --species "L. ornata" --candidate ./photo.jpg
//!
//! # Sweep every reference against every labelled test image
//! specimatch evaluate --output results.jsonl
//!
//! # View configuration
//! specimatch config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use specimatch_core::Config;

mod cli;
mod logging;

/// Specimatch - species verification against reference samples.
#[derive(Parser, Debug)]
#[command(name = "specimatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SPECIMATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare one candidate image against one reference (default)
    Match(cli::matching::MatchArgs),

    /// Compare every reference against every labelled test image
    Evaluate(cli::evaluate::EvaluateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn creates_config(command: &Option<Commands>) -> bool {
    use cli::config::ConfigCommand;

    matches!(
        command,
        Some(Commands::Config(cli::config::ConfigArgs {
            command: ConfigCommand::Init { .. } | ConfigCommand::Path,
        }))
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match &cli.config {
        // `config init` and `config path` may name a file that doesn't exist yet
        Some(path) if !path.exists() && creates_config(&cli.command) => Config::default(),
        Some(path) => Config::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `specimatch config path`."
                );
                Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Specimatch v{}", specimatch_core::VERSION);

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    match cli.command {
        Some(Commands::Match(args)) => cli::matching::execute(args, config).await,
        Some(Commands::Evaluate(args)) => cli::evaluate::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args, config, &config_path).await,
        None => cli::matching::execute(cli::matching::MatchArgs::default(), config).await,
    }
}
