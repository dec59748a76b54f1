//! metricize CLI - convert questions to metrics and back
//!
//! Usage:
//!   metricize check --question <card.json> [--metadata <metadata.json>]
//!   metricize draft --question <card.json> [--metadata <metadata.json>]
//!   metricize apply --question <card.json> --metric <metric.json> [--environment <env>]
//!
//! The metadata path and environment default to the values in metricize.toml.

use clap::{Parser, Subcommand, ValueEnum};
use metricize::config::{Environment, Settings};
use metricize::convert::{check_eligibility, try_apply_metric, try_draft_metric, ApplyOptions};
use metricize::model::loader::{load_card, load_metadata, load_metric};
use metricize::query::Question;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metricize")]
#[command(about = "metricize - convert questions into metric definitions and back")]
#[command(version)]
struct Cli {
    /// Metadata JSON file (overrides `metadata_path` in the config file)
    #[arg(short, long, global = true)]
    metadata: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a question can be used as a metric
    Check {
        /// Path to the question (card) JSON
        #[arg(short, long)]
        question: PathBuf,
    },

    /// Draft a metric from a question and print it as JSON
    Draft {
        /// Path to the question (card) JSON
        #[arg(short, long)]
        question: PathBuf,
    },

    /// Apply a metric to a question and print the new question as JSON
    Apply {
        /// Path to the question (card) JSON
        #[arg(short, long)]
        question: PathBuf,

        /// Path to the metric JSON
        #[arg(long)]
        metric: PathBuf,

        /// Environment (defaults to the configured one)
        #[arg(short, long)]
        environment: Option<EnvironmentArg>,
    },
}

#[derive(Clone, ValueEnum)]
enum EnvironmentArg {
    Production,
    Development,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Production => Environment::Production,
            EnvironmentArg::Development => Environment::Development,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings);

    let metadata_path = cli
        .metadata
        .clone()
        .map(Ok)
        .or_else(|| settings.metadata_path().transpose());
    let metadata_path = match metadata_path {
        Some(Ok(path)) => path,
        Some(Err(e)) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
        None => {
            eprintln!("No metadata file given (use --metadata or set metadata_path)");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check { question } => cmd_check(&metadata_path, &question),
        Commands::Draft { question } => cmd_draft(&metadata_path, &question),
        Commands::Apply {
            question,
            metric,
            environment,
        } => {
            let environment = environment.map(Environment::from).unwrap_or(settings.environment);
            cmd_apply(&metadata_path, &question, &metric, environment)
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` or the configured level.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_question(metadata_path: &Path, question_path: &Path) -> Result<Question, String> {
    let metadata = load_metadata(metadata_path).map_err(|e| e.to_string())?;
    let card = load_card(question_path).map_err(|e| e.to_string())?;
    Question::from_card(card, Arc::new(metadata))
        .map_err(|e| format!("Invalid question '{}': {}", question_path.display(), e))
}

fn cmd_check(metadata_path: &Path, question_path: &Path) -> ExitCode {
    let question = match load_question(metadata_path, question_path) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match check_eligibility(Some(&question)) {
        Ok(eligible) => {
            println!("Question {} can be used as a metric", question.id());
            println!("  Measure: {}", eligible.aggregation.to_value());
            println!("  Time axis: {}", eligible.date_dimension.display_name());
            ExitCode::SUCCESS
        }
        Err(reason) => {
            eprintln!("Question {} cannot be used as a metric: {}", question.id(), reason);
            ExitCode::FAILURE
        }
    }
}

fn cmd_draft(metadata_path: &Path, question_path: &Path) -> ExitCode {
    let question = match load_question(metadata_path, question_path) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let metric = match try_draft_metric(&question) {
        Ok(metric) => metric,
        Err(reason) => {
            eprintln!("Cannot draft a metric: {}", reason);
            return ExitCode::FAILURE;
        }
    };

    print_json(&metric)
}

fn cmd_apply(
    metadata_path: &Path,
    question_path: &Path,
    metric_path: &Path,
    environment: Environment,
) -> ExitCode {
    let question = match load_question(metadata_path, question_path) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let metric = match load_metric(metric_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = ApplyOptions::new(environment);
    match try_apply_metric(&question, &metric, &options) {
        Ok(applied) => print_json(&applied.to_card()),
        Err(reason) => {
            eprintln!("Cannot apply metric '{}': {}", metric.name, reason);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
