mod eval;
mod input;
mod report;
mod scoring;
mod telemetry;

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::eval::{CutoffResult, EvalError, EvalOutcome, EvalParams, eval_retriever};
use crate::input::{InputError, load_predictions, load_references};
use crate::report::ReportError;
use crate::report::calibration::write_calibration;
use crate::report::json::write_summary;
use crate::report::text::{render_confidences, render_hits, render_incorrects};

#[derive(Debug, Parser)]
#[command(version, about = "Evaluate hits@k of retrieved QA pairs against gold answers")]
struct Cli {
    /// Retrieval results to evaluate, in retrieved-QA JSON-lines format
    #[arg(long)]
    predictions: PathBuf,

    /// Gold answers, JSON-lines
    #[arg(long)]
    references: PathBuf,

    /// Comma separated list of K to evaluate hits@K for
    #[arg(long = "hits_at_k", default_value = "1,10,50")]
    hits_at_k: String,

    /// Print incorrectly answered questions
    #[arg(
        long = "print_incorrect",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    print_incorrect: bool,

    /// Export (hit, top-1 score) calibration pairs as JSON
    #[arg(long = "export_calibration")]
    export_calibration: Option<PathBuf>,

    /// Cutoff whose results are exported as calibration pairs
    #[arg(long = "calibration_k", default_value_t = 1)]
    calibration_k: usize,

    /// Write a JSON summary of the run
    #[arg(long = "summary_json")]
    summary_json: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone)]
struct RunConfig {
    predictions: PathBuf,
    references: PathBuf,
    hits_at_k: Vec<usize>,
    print_incorrect: bool,
    export_calibration: Option<PathBuf>,
    calibration_k: usize,
    summary_json: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("invalid --hits_at_k: {0}")]
    InvalidCutoffs(String),
    #[error("invalid --calibration_k: must be a positive integer")]
    InvalidCalibrationK,
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to write report: {0}")]
    Stdout(#[from] std::io::Error),
}

impl TryFrom<Cli> for RunConfig {
    type Error = RunError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.calibration_k == 0 {
            return Err(RunError::InvalidCalibrationK);
        }
        Ok(RunConfig {
            hits_at_k: parse_hits_at_k(&cli.hits_at_k)?,
            predictions: cli.predictions,
            references: cli.references,
            print_incorrect: cli.print_incorrect,
            export_calibration: cli.export_calibration,
            calibration_k: cli.calibration_k,
            summary_json: cli.summary_json,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    let config = RunConfig::try_from(cli)?;

    let refs = load_references(&config.references)?;
    let preds = load_predictions(&config.predictions)?;

    if config.export_calibration.is_some() && !config.hits_at_k.contains(&config.calibration_k) {
        tracing::warn!(
            "calibration_k={} is not among the requested cutoffs; calibration export will be empty",
            config.calibration_k
        );
    }

    let outcome = eval_retriever(
        &refs,
        &preds,
        &EvalParams {
            hits_at_k: &config.hits_at_k,
            print_incorrect: config.print_incorrect,
            export_calibration: config.export_calibration.is_some(),
            calibration_k: config.calibration_k,
        },
    )?;
    warn_on_empty_confidences(&outcome);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render_hits(&outcome).as_bytes())?;

    if let Some(path) = &config.export_calibration {
        write_calibration(&outcome.calibration_pairs, path)?;
    }

    if config.print_incorrect {
        stdout.write_all(render_incorrects(&outcome.incorrects)?.as_bytes())?;
    }

    stdout.write_all(render_confidences(&outcome).as_bytes())?;
    stdout.flush()?;

    if let Some(path) = &config.summary_json {
        write_summary(&outcome, refs.len(), path)?;
    }

    Ok(())
}

/// Parses a comma separated cutoff list and sorts it ascending. Duplicates are kept.
fn parse_hits_at_k(raw: &str) -> Result<Vec<usize>, RunError> {
    let mut ks = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        let k: usize = part
            .parse()
            .map_err(|_| RunError::InvalidCutoffs(format!("'{part}' is not a positive integer")))?;
        if k == 0 {
            return Err(RunError::InvalidCutoffs("cutoffs must be positive".to_string()));
        }
        ks.push(k);
    }
    ks.sort_unstable();
    Ok(ks)
}

fn warn_on_empty_confidences(outcome: &EvalOutcome) {
    if outcome
        .cutoffs
        .iter()
        .all(|c| matches!(c, CutoffResult::Skipped { .. }))
    {
        tracing::warn!("every requested cutoff was skipped; nothing was scored");
        return;
    }
    if outcome.hit_confidences.is_empty() {
        tracing::warn!("no hits at any cutoff; hit confidence average is undefined");
    }
    if outcome.miss_confidences.is_empty() {
        tracing::warn!("no misses at any cutoff; miss confidence average is undefined");
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
