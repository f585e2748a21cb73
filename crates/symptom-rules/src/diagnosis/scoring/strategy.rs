use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::diagnosis::outcome::Evaluation;
use crate::diagnosis::rule::SymptomRule;

use super::{confidence, evaluation};

/// Signature shared by custom evaluation strategies.
pub type EvaluationFn =
    dyn Fn(&[&SymptomRule], &[&SymptomRule]) -> Result<Evaluation, StrategyError> + Send + Sync;

/// Signature shared by custom confidence strategies.
pub type ConfidenceFn = dyn Fn(&[&SymptomRule], &[&SymptomRule]) -> f64 + Send + Sync;

/// Configuration errors raised while selecting or running a strategy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("unknown evaluation function '{0}'")]
    UnknownEvaluation(String),
    #[error("unknown confidence function '{0}'")]
    UnknownConfidence(String),
    #[error("unknown score function '{0}'")]
    UnknownScoreFunction(String),
    #[error("invalid type for {argument}: expected a strategy name or object, found {found}")]
    InvalidType {
        argument: &'static str,
        found: &'static str,
    },
    #[error("{strategy} requires the `{option}` option")]
    MissingOption {
        strategy: &'static str,
        option: &'static str,
    },
    #[error("invalid `{option}` option for {strategy}: {reason}")]
    InvalidOption {
        strategy: &'static str,
        option: &'static str,
        reason: String,
    },
    #[error("the threshold label map cannot be empty")]
    EmptyThresholdMap,
    #[error("the label list cannot be empty")]
    EmptyLabels,
}

/// Monotone (or custom) transform applied to a raw weighted score.
#[derive(Clone)]
pub enum ScoreTransform {
    Identity,
    Tanh,
    Sigmoid,
    Reciprocal,
    Log1p,
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl ScoreTransform {
    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(function))
    }

    pub fn apply(&self, score: f64) -> f64 {
        match self {
            ScoreTransform::Identity => score,
            ScoreTransform::Tanh => score.tanh(),
            ScoreTransform::Sigmoid => 1.0 / (1.0 + (-score).exp()),
            ScoreTransform::Reciprocal => 1.0 / score,
            ScoreTransform::Log1p => score.ln_1p(),
            ScoreTransform::Custom(function) => function(score),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScoreTransform::Identity => "identity",
            ScoreTransform::Tanh => "tanh",
            ScoreTransform::Sigmoid => "sigmoid",
            ScoreTransform::Reciprocal => "reciprocal",
            ScoreTransform::Log1p => "log1p",
            ScoreTransform::Custom(_) => "custom",
        }
    }
}

impl FromStr for ScoreTransform {
    type Err = StrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "tanh" => Ok(Self::Tanh),
            "sigmoid" | "logistic" => Ok(Self::Sigmoid),
            "reciprocal" | "inverse" => Ok(Self::Reciprocal),
            "log1p" => Ok(Self::Log1p),
            _ => Err(StrategyError::UnknownScoreFunction(value.to_string())),
        }
    }
}

impl fmt::Debug for ScoreTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy turning applicable rules into a labeled score.
#[derive(Clone, Default)]
pub enum EvaluationFunction {
    #[default]
    Default,
    BinarySimple,
    BinaryScoringBased {
        score_function: ScoreTransform,
        score_threshold: f64,
    },
    MulticlassSimple {
        labels: Vec<String>,
    },
    MulticlassScoringBased {
        score_function: ScoreTransform,
        threshold_label_map: Vec<(f64, String)>,
    },
    Custom(Arc<EvaluationFn>),
}

impl EvaluationFunction {
    pub const NAMES: [&'static str; 5] = [
        "default",
        "binary_simple",
        "binary_scoring_based",
        "multiclass_simple",
        "multiclass_scoring_based",
    ];

    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(&[&SymptomRule], &[&SymptomRule]) -> Result<Evaluation, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        Self::Custom(Arc::new(function))
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvaluationFunction::Default => "default",
            EvaluationFunction::BinarySimple => "binary_simple",
            EvaluationFunction::BinaryScoringBased { .. } => "binary_scoring_based",
            EvaluationFunction::MulticlassSimple { .. } => "multiclass_simple",
            EvaluationFunction::MulticlassScoringBased { .. } => "multiclass_scoring_based",
            EvaluationFunction::Custom(_) => "custom",
        }
    }

    pub fn apply(
        &self,
        applicable: &[&SymptomRule],
        all: &[&SymptomRule],
    ) -> Result<Evaluation, StrategyError> {
        match self {
            EvaluationFunction::Default => Ok(evaluation::default_evaluation(applicable, all)),
            EvaluationFunction::BinarySimple => Ok(evaluation::binary_simple(applicable, all)),
            EvaluationFunction::BinaryScoringBased {
                score_function,
                score_threshold,
            } => Ok(evaluation::binary_scoring_based(
                applicable,
                all,
                |score| score_function.apply(score),
                *score_threshold,
            )),
            EvaluationFunction::MulticlassSimple { labels } => {
                evaluation::multiclass_simple(applicable, all, labels)
            }
            EvaluationFunction::MulticlassScoringBased {
                score_function,
                threshold_label_map,
            } => evaluation::multiclass_scoring_based(
                applicable,
                all,
                |score| score_function.apply(score),
                threshold_label_map,
            ),
            EvaluationFunction::Custom(function) => function(applicable, all),
        }
    }

    /// Resolves a strategy from a name string or a `{ "name": ..., options }` object.
    pub fn resolve(spec: &Value) -> Result<Self, StrategyError> {
        match spec {
            Value::String(name) => name.parse(),
            Value::Object(options) => {
                let name = options.get("name").and_then(Value::as_str).ok_or(
                    StrategyError::MissingOption {
                        strategy: "evaluation_function",
                        option: "name",
                    },
                )?;
                Self::from_options(name, options)
            }
            other => Err(StrategyError::InvalidType {
                argument: "evaluation_function",
                found: json_type(other),
            }),
        }
    }

    fn from_options(name: &str, options: &Map<String, Value>) -> Result<Self, StrategyError> {
        match normalize(name).as_str() {
            "binary_scoring_based" => Ok(Self::BinaryScoringBased {
                score_function: score_function_option("binary_scoring_based", options)?,
                score_threshold: required_f64("binary_scoring_based", "score_threshold", options)?,
            }),
            "multiclass_simple" => match options.get("labels") {
                Some(labels) => Ok(Self::MulticlassSimple {
                    labels: parse_labels(labels)?,
                }),
                None => name.parse(),
            },
            "multiclass_scoring_based" => {
                let thresholds = options.get("threshold_label_map").ok_or(
                    StrategyError::MissingOption {
                        strategy: "multiclass_scoring_based",
                        option: "threshold_label_map",
                    },
                )?;
                Ok(Self::MulticlassScoringBased {
                    score_function: score_function_option("multiclass_scoring_based", options)?,
                    threshold_label_map: parse_threshold_map(thresholds)?,
                })
            }
            _ => name.parse(),
        }
    }
}

impl FromStr for EvaluationFunction {
    type Err = StrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "default" => Ok(Self::Default),
            "binary_simple" => Ok(Self::BinarySimple),
            "multiclass_simple" => Ok(Self::MulticlassSimple {
                labels: vec![
                    evaluation::LOW.to_string(),
                    evaluation::MEDIUM.to_string(),
                    evaluation::HIGH.to_string(),
                ],
            }),
            "binary_scoring_based" => Err(StrategyError::MissingOption {
                strategy: "binary_scoring_based",
                option: "score_threshold",
            }),
            "multiclass_scoring_based" => Err(StrategyError::MissingOption {
                strategy: "multiclass_scoring_based",
                option: "threshold_label_map",
            }),
            _ => Err(StrategyError::UnknownEvaluation(value.to_string())),
        }
    }
}

impl fmt::Debug for EvaluationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationFunction::BinaryScoringBased {
                score_function,
                score_threshold,
            } => f
                .debug_struct("BinaryScoringBased")
                .field("score_function", score_function)
                .field("score_threshold", score_threshold)
                .finish(),
            EvaluationFunction::MulticlassSimple { labels } => f
                .debug_struct("MulticlassSimple")
                .field("labels", labels)
                .finish(),
            EvaluationFunction::MulticlassScoringBased {
                score_function,
                threshold_label_map,
            } => f
                .debug_struct("MulticlassScoringBased")
                .field("score_function", score_function)
                .field("threshold_label_map", threshold_label_map)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Strategy measuring how certain a diagnosis is, in `[0, 1]`.
#[derive(Clone, Default)]
pub enum ConfidenceFunction {
    #[default]
    Weighted,
    Entropy,
    RuleCoverage,
    Custom(Arc<ConfidenceFn>),
}

impl ConfidenceFunction {
    pub const NAMES: [&'static str; 3] = ["weighted", "entropy", "rule_coverage"];

    pub fn custom<F>(function: F) -> Self
    where
        F: Fn(&[&SymptomRule], &[&SymptomRule]) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(function))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfidenceFunction::Weighted => "weighted",
            ConfidenceFunction::Entropy => "entropy",
            ConfidenceFunction::RuleCoverage => "rule_coverage",
            ConfidenceFunction::Custom(_) => "custom",
        }
    }

    pub fn apply(&self, applicable: &[&SymptomRule], all: &[&SymptomRule]) -> f64 {
        match self {
            ConfidenceFunction::Weighted => confidence::weighted_confidence(applicable, all),
            ConfidenceFunction::Entropy => confidence::entropy_confidence(applicable, all),
            ConfidenceFunction::RuleCoverage => {
                confidence::rule_coverage_confidence(applicable, all)
            }
            ConfidenceFunction::Custom(function) => {
                let raw = function(applicable, all);
                let bounded = if raw.is_nan() {
                    0.0
                } else {
                    raw.clamp(0.0, 1.0)
                };
                if bounded != raw {
                    warn!(raw, bounded, "custom confidence outside [0, 1]; clamping");
                }
                bounded
            }
        }
    }

    /// Resolves a strategy from a name string; objects are accepted when they carry a `name`.
    pub fn resolve(spec: &Value) -> Result<Self, StrategyError> {
        match spec {
            Value::String(name) => name.parse(),
            Value::Object(options) => options
                .get("name")
                .and_then(Value::as_str)
                .ok_or(StrategyError::MissingOption {
                    strategy: "confidence_function",
                    option: "name",
                })?
                .parse(),
            other => Err(StrategyError::InvalidType {
                argument: "confidence_function",
                found: json_type(other),
            }),
        }
    }
}

impl FromStr for ConfidenceFunction {
    type Err = StrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "weighted" => Ok(Self::Weighted),
            "entropy" => Ok(Self::Entropy),
            "rule_coverage" => Ok(Self::RuleCoverage),
            _ => Err(StrategyError::UnknownConfidence(value.to_string())),
        }
    }
}

impl fmt::Debug for ConfidenceFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(what: &str, found: &Value) -> String {
    format!("expected {what}, found {}", json_type(found))
}

fn score_function_option(
    strategy: &'static str,
    options: &Map<String, Value>,
) -> Result<ScoreTransform, StrategyError> {
    match options.get("score_function") {
        None => Ok(ScoreTransform::Identity),
        Some(Value::String(name)) => name.parse(),
        Some(other) => Err(StrategyError::InvalidOption {
            strategy,
            option: "score_function",
            reason: expected("a function name", other),
        }),
    }
}

fn required_f64(
    strategy: &'static str,
    option: &'static str,
    options: &Map<String, Value>,
) -> Result<f64, StrategyError> {
    let value = options
        .get(option)
        .ok_or(StrategyError::MissingOption { strategy, option })?;
    value.as_f64().ok_or_else(|| StrategyError::InvalidOption {
        strategy,
        option,
        reason: expected("a number", value),
    })
}

fn parse_labels(value: &Value) -> Result<Vec<String>, StrategyError> {
    let invalid = |reason: String| StrategyError::InvalidOption {
        strategy: "multiclass_simple",
        option: "labels",
        reason,
    };

    let items = value
        .as_array()
        .ok_or_else(|| invalid(expected("an array", value)))?;
    let labels = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(expected("string labels", item)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if labels.is_empty() {
        return Err(StrategyError::EmptyLabels);
    }
    Ok(labels)
}

fn parse_threshold_map(value: &Value) -> Result<Vec<(f64, String)>, StrategyError> {
    let invalid = |reason: String| StrategyError::InvalidOption {
        strategy: "multiclass_scoring_based",
        option: "threshold_label_map",
        reason,
    };

    let entries = value
        .as_object()
        .ok_or_else(|| invalid(expected("an object", value)))?;
    if entries.is_empty() {
        return Err(StrategyError::EmptyThresholdMap);
    }

    entries
        .iter()
        .map(|(threshold, label)| -> Result<(f64, String), StrategyError> {
            let threshold = threshold
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(format!("threshold '{threshold}' is not a number")))?;
            let label = label
                .as_str()
                .ok_or_else(|| invalid(format!("label for {threshold} must be a string")))?;
            Ok((threshold, label.to_string()))
        })
        .collect()
}
