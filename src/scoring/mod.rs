use std::sync::LazyLock;

use regex::Regex;

static ARTICLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(a|an|the)\b").expect("article pattern compiles")
});

/// SQuAD-style answer normalisation: lowercase, drop ASCII punctuation,
/// drop the articles a/an/the, collapse whitespace.
pub fn normalize_answer(s: &str) -> String {
    let lower = s.to_lowercase();
    let no_punc: String = lower.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let no_articles = ARTICLES.replace_all(&no_punc, " ");
    no_articles.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn exact_match_score(prediction: &str, ground_truth: &str) -> bool {
    normalize_answer(prediction) == normalize_answer(ground_truth)
}

pub fn metric_max_over_ground_truths<F>(metric: F, prediction: &str, ground_truths: &[String]) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    ground_truths.iter().any(|gt| metric(prediction, gt))
}

#[cfg(test)]
#[path = "../../tests/src_inline/scoring/tests.rs"]
mod tests;
