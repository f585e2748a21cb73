use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CORE_FIELDS: [&str; 3] = ["total_score", "label", "confidence"];

/// Labeled score produced by an evaluation strategy.
///
/// Custom strategies attach additional fields through `extra`; they are carried onto the
/// resulting [`Diagnosis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub label: String,
    pub score: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Evaluation {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Final record of one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    total_score: Option<f64>,
    label: Option<String>,
    confidence: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Diagnosis {
    /// Unevaluated record carrying only extension field defaults.
    pub(crate) fn template(fields: &Map<String, Value>) -> Self {
        Self {
            extra: without_core_fields(fields.clone()),
            ..Self::default()
        }
    }

    pub(crate) fn assemble(
        fields: &Map<String, Value>,
        evaluation: Evaluation,
        confidence: f64,
    ) -> Self {
        let mut extra = without_core_fields(fields.clone());
        extra.extend(without_core_fields(evaluation.extra));

        Self {
            total_score: Some(evaluation.score),
            label: Some(evaluation.label),
            confidence: Some(confidence),
            extra,
        }
    }

    pub fn total_score(&self) -> Option<f64> {
        self.total_score
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn is_evaluated(&self) -> bool {
        self.total_score.is_some() && self.label.is_some()
    }
}

fn without_core_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.retain(|key, _| !CORE_FIELDS.contains(&key.as_str()));
    fields
}
