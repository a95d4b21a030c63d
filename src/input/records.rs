use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceRecord {
    pub answer: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRecord {
    pub input_qa: Value,
    pub retrieved_qas: Vec<RetrievedQa>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedQa {
    pub answer: Vec<String>,
    pub score: f64,
    /// Any other fields of the retrieved pair (question, id, ...), kept for diagnostics.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RetrievedQa {
    pub fn first_answer(&self) -> Option<&str> {
        self.answer.first().map(String::as_str)
    }
}

impl PredictionRecord {
    pub fn top1(&self) -> Option<&RetrievedQa> {
        self.retrieved_qas.first()
    }
}
