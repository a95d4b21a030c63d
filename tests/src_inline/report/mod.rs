use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Map, Value, json};

use super::calibration::{render_calibration, write_calibration};
use super::json::{build_summary, render_summary_json, write_summary};
use super::text::{hits_line, render_confidences, render_hits, render_incorrects};
use super::*;
use crate::eval::{CutoffResult, EvalOutcome, HitsAtK, IncorrectExample};
use crate::input::RetrievedQa;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("paq_hits_eval_report_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn hits(k: usize, per_example: Vec<bool>) -> HitsAtK {
    HitsAtK {
        k,
        hits: per_example.iter().filter(|&&h| h).count(),
        total: per_example.len(),
        per_example,
    }
}

fn build_outcome() -> EvalOutcome {
    EvalOutcome {
        cutoffs: vec![
            CutoffResult::Evaluated(hits(1, vec![true, false, false])),
            CutoffResult::Evaluated(hits(10, vec![true, true, false])),
            CutoffResult::Skipped {
                k: 1000,
                max_available: 50,
            },
        ],
        incorrects: vec![IncorrectExample {
            input_qa: json!({ "question": "who?" }),
            retrieved_qa: RetrievedQa {
                answer: vec!["nobody".to_string()],
                score: 0.25,
                extra: Map::new(),
            },
        }],
        hit_confidences: vec![0.5, 1.0],
        miss_confidences: vec![0.25],
        calibration_pairs: vec![(true, 0.5), (false, 0.25)],
    }
}

#[test]
fn test_hits_line_format() {
    assert_eq!(hits_line(&hits(1, vec![true])), "1: 100.0% (1 / 1)");
    assert_eq!(hits_line(&hits(10, vec![true, false, false])), "10: 33.3% (1 / 3)");
}

#[test]
fn test_render_hits_omits_skipped() {
    let text = render_hits(&build_outcome());
    assert_eq!(text, "1: 33.3% (1 / 3)\n10: 66.7% (2 / 3)\n");
    assert!(!text.contains("1000"));
}

#[test]
fn test_render_confidences() {
    let text = render_confidences(&build_outcome());
    assert_eq!(text, "Hits' average score: 0.75\nMisses' average score: 0.25\n");

    let empty = EvalOutcome::default();
    assert!(render_confidences(&empty).contains("Hits' average score: n/a"));
}

#[test]
fn test_render_confidences_keeps_decimal_point() {
    let mut outcome = build_outcome();
    outcome.hit_confidences = vec![1.0, 1.0];
    outcome.miss_confidences = vec![0.0];
    assert_eq!(
        render_confidences(&outcome),
        "Hits' average score: 1.0\nMisses' average score: 0.0\n"
    );
}

#[test]
fn test_render_incorrects_is_pretty_json() {
    let outcome = build_outcome();
    let text = render_incorrects(&outcome.incorrects).unwrap();
    assert!(text.starts_with("Below are incorrectly answered questions:\n"));
    assert!(text.contains("\"question\": \"who?\""));
    assert!(text.contains("\"score\": 0.25"));
}

#[test]
fn test_calibration_export() {
    let outcome = build_outcome();
    assert_eq!(
        render_calibration(&outcome.calibration_pairs).unwrap(),
        "[[true,0.5],[false,0.25]]"
    );

    let dir = make_temp_dir();
    let path = dir.join("nested").join("calibration.json");
    write_calibration(&outcome.calibration_pairs, &path).unwrap();
    let parsed: Vec<(bool, f64)> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, outcome.calibration_pairs);
}

#[test]
fn test_summary_json() {
    let outcome = build_outcome();
    let summary = build_summary(&outcome, 3);
    assert_eq!(summary.skipped_k, vec![1000]);
    assert_eq!(summary.hits_at_k.len(), 2);

    let json: Value = serde_json::from_str(&render_summary_json(&summary).unwrap()).unwrap();
    assert_eq!(json["n_examples"], 3);
    assert_eq!(json["hits_at_k"][1]["k"], 10);
    assert_eq!(json["hits_at_k"][1]["hits"], 2);
    assert!(json["hits_at_k"][1].get("per_example").is_none());
    assert_eq!(json["hit_confidence_mean"], 0.75);

    let dir = make_temp_dir();
    let path = dir.join("summary.json");
    write_summary(&outcome, 3, &path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_summary_null_mean_when_empty() {
    let outcome = EvalOutcome::default();
    let json: Value =
        serde_json::from_str(&render_summary_json(&build_summary(&outcome, 0)).unwrap()).unwrap();
    assert!(json["miss_confidence_mean"].is_null());
}

#[test]
fn test_format_score() {
    assert_eq!(format_score(Some(0.5)), "0.5");
    assert_eq!(format_score(Some(1.0)), "1.0");
    assert_eq!(format_score(None), "n/a");
}
