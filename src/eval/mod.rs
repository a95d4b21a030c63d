use serde::Serialize;
use serde_json::Value;

use crate::input::{PredictionRecord, ReferenceRecord, RetrievedQa};
use crate::scoring::{exact_match_score, metric_max_over_ground_truths};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("number of references doesn't match number of predictions ({refs} vs {preds})")]
    LengthMismatch { refs: usize, preds: usize },
    #[error("no examples to evaluate")]
    NoExamples,
    #[error("prediction {index} has no retrieved candidates")]
    NoCandidates { index: usize },
    #[error("prediction {index}: retrieved candidate at rank {rank} has no answer strings")]
    MissingAnswer { index: usize, rank: usize },
}

#[derive(Debug, Clone)]
pub struct EvalParams<'a> {
    /// Ascending cutoffs.
    pub hits_at_k: &'a [usize],
    pub print_incorrect: bool,
    pub export_calibration: bool,
    pub calibration_k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitsAtK {
    pub k: usize,
    pub hits: usize,
    pub total: usize,
    /// Hit flag per example, in input order. Feeds the calibration export.
    #[serde(skip)]
    pub per_example: Vec<bool>,
}

impl HitsAtK {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.hits as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CutoffResult {
    Evaluated(HitsAtK),
    Skipped { k: usize, max_available: usize },
}

impl CutoffResult {
    pub fn k(&self) -> usize {
        match self {
            CutoffResult::Evaluated(h) => h.k,
            CutoffResult::Skipped { k, .. } => *k,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncorrectExample {
    pub input_qa: Value,
    pub retrieved_qa: RetrievedQa,
}

/// (hit, top-1 score)
pub type CalibrationPair = (bool, f64);

#[derive(Debug, Clone, Default)]
pub struct EvalOutcome {
    pub cutoffs: Vec<CutoffResult>,
    pub incorrects: Vec<IncorrectExample>,
    pub hit_confidences: Vec<f64>,
    pub miss_confidences: Vec<f64>,
    pub calibration_pairs: Vec<CalibrationPair>,
}

impl EvalOutcome {
    pub fn hit_confidence_mean(&self) -> Option<f64> {
        mean(&self.hit_confidences)
    }

    pub fn miss_confidence_mean(&self) -> Option<f64> {
        mean(&self.miss_confidences)
    }

    pub fn evaluated(&self) -> impl Iterator<Item = &HitsAtK> {
        self.cutoffs.iter().filter_map(|c| match c {
            CutoffResult::Evaluated(h) => Some(h),
            CutoffResult::Skipped { .. } => None,
        })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Scores every cutoff in `params.hits_at_k` over the positionally aligned
/// `refs`/`preds`.
///
/// The hit/miss confidence collections and the incorrect-example list are
/// shared by all cutoffs, so an example contributes once per evaluated k.
/// This matches the reference tool's reported averages; it is likely an
/// accident there, and callers wanting per-k figures should evaluate one k at
/// a time.
pub fn eval_retriever(
    refs: &[ReferenceRecord],
    preds: &[PredictionRecord],
    params: &EvalParams<'_>,
) -> Result<EvalOutcome, EvalError> {
    if refs.len() != preds.len() {
        return Err(EvalError::LengthMismatch {
            refs: refs.len(),
            preds: preds.len(),
        });
    }
    if refs.is_empty() {
        return Err(EvalError::NoExamples);
    }

    let top1s = preds
        .iter()
        .enumerate()
        .map(|(index, p)| p.top1().ok_or(EvalError::NoCandidates { index }))
        .collect::<Result<Vec<_>, _>>()?;

    let max_available = preds
        .iter()
        .map(|p| p.retrieved_qas.len())
        .min()
        .unwrap_or(0);

    let mut outcome = EvalOutcome::default();

    for &k in params.hits_at_k {
        if k > max_available {
            tracing::warn!(
                "Skipping hits@{k} eval as {k} is larger than number of retrieved results ({max_available})"
            );
            outcome
                .cutoffs
                .push(CutoffResult::Skipped { k, max_available });
            continue;
        }

        let mut per_example = Vec::with_capacity(refs.len());
        for (index, ((r, p), &top1)) in refs.iter().zip(preds).zip(&top1s).enumerate() {
            let hit = any_hit_in_top_k(index, &r.answer, p, k)?;
            per_example.push(hit);

            if hit {
                outcome.hit_confidences.push(top1.score);
            } else {
                outcome.miss_confidences.push(top1.score);
                if params.print_incorrect {
                    outcome.incorrects.push(IncorrectExample {
                        input_qa: p.input_qa.clone(),
                        retrieved_qa: top1.clone(),
                    });
                }
            }
        }

        if params.export_calibration && k == params.calibration_k {
            outcome.calibration_pairs.extend(
                per_example
                    .iter()
                    .zip(&top1s)
                    .map(|(&hit, top1)| (hit, top1.score)),
            );
        }

        let hits = per_example.iter().filter(|&&h| h).count();
        tracing::debug!(k, hits, total = per_example.len(), "scored cutoff");
        outcome.cutoffs.push(CutoffResult::Evaluated(HitsAtK {
            k,
            hits,
            total: per_example.len(),
            per_example,
        }));
    }

    Ok(outcome)
}

fn any_hit_in_top_k(
    index: usize,
    ref_answers: &[String],
    pred: &PredictionRecord,
    k: usize,
) -> Result<bool, EvalError> {
    for (rank, candidate) in pred.retrieved_qas.iter().take(k).enumerate() {
        let answer = candidate
            .first_answer()
            .ok_or(EvalError::MissingAnswer { index, rank })?;
        if metric_max_over_ground_truths(exact_match_score, answer, ref_answers) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
#[path = "../../tests/src_inline/eval/tests.rs"]
mod tests;
