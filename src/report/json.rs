use std::path::Path;

use serde::Serialize;

use crate::eval::{CutoffResult, EvalOutcome, HitsAtK};
use crate::report::{ReportError, write_text};

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub n_examples: usize,
    pub hits_at_k: Vec<SummaryRow<'a>>,
    pub skipped_k: Vec<usize>,
    pub hit_confidence_mean: Option<f64>,
    pub miss_confidence_mean: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SummaryRow<'a> {
    #[serde(flatten)]
    pub hits: &'a HitsAtK,
    pub percentage: f64,
}

pub fn build_summary(outcome: &EvalOutcome, n_examples: usize) -> Summary<'_> {
    let hits_at_k = outcome
        .evaluated()
        .map(|h| SummaryRow {
            hits: h,
            percentage: h.percentage(),
        })
        .collect();
    let skipped_k = outcome
        .cutoffs
        .iter()
        .filter(|c| matches!(c, CutoffResult::Skipped { .. }))
        .map(CutoffResult::k)
        .collect();
    Summary {
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        n_examples,
        hits_at_k,
        skipped_k,
        hit_confidence_mean: outcome.hit_confidence_mean(),
        miss_confidence_mean: outcome.miss_confidence_mean(),
    }
}

pub fn render_summary_json(summary: &Summary<'_>) -> Result<String, ReportError> {
    serde_json::to_string_pretty(summary).map_err(|source| ReportError::Serialize {
        what: "summary",
        source,
    })
}

pub fn write_summary(
    outcome: &EvalOutcome,
    n_examples: usize,
    path: &Path,
) -> Result<(), ReportError> {
    let summary = build_summary(outcome, n_examples);
    let json = render_summary_json(&summary)?;
    write_text(path, &json)?;
    tracing::info!(path = %path.display(), "wrote summary");
    Ok(())
}
