use crate::eval::{EvalOutcome, HitsAtK, IncorrectExample};
use crate::report::{ReportError, format_score};

pub fn hits_line(h: &HitsAtK) -> String {
    format!("{}: {:.1}% ({} / {})", h.k, h.percentage(), h.hits, h.total)
}

/// One line per evaluated cutoff; skipped cutoffs produce nothing.
pub fn render_hits(outcome: &EvalOutcome) -> String {
    let mut out = String::new();
    for h in outcome.evaluated() {
        out.push_str(&hits_line(h));
        out.push('\n');
    }
    out
}

pub fn render_confidences(outcome: &EvalOutcome) -> String {
    format!(
        "Hits' average score: {}\nMisses' average score: {}\n",
        format_score(outcome.hit_confidence_mean()),
        format_score(outcome.miss_confidence_mean())
    )
}

pub fn render_incorrects(incorrects: &[IncorrectExample]) -> Result<String, ReportError> {
    let body = serde_json::to_string_pretty(incorrects).map_err(|source| {
        ReportError::Serialize {
            what: "incorrect examples",
            source,
        }
    })?;
    Ok(format!("Below are incorrectly answered questions:\n{body}\n"))
}
