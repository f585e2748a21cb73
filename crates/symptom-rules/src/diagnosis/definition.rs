use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rule::RuleDefinition;
use super::ruleset::{RulesetError, SymptomRuleset};
use super::scoring::{ConfidenceFunction, EvaluationFunction, StrategyError};

/// Errors raised while loading a rule definition file.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("unable to read rule definitions from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rule definitions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Ruleset(#[from] RulesetError),
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// On-disk description of a ruleset plus optional strategy selections.
///
/// ```json
/// {
///   "evaluation": "default",
///   "confidence": "weighted",
///   "rules": [
///     {
///       "name": "fever",
///       "weight": 5.0,
///       "when": [{ "field": "temperature", "op": "gt", "value": 38 }]
///     },
///     { "name": "cough", "weight": 1.5, "conditions": ["cough"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    pub rules: Vec<RuleDefinition>,
}

impl RulesetDefinition {
    pub fn from_json_str(raw: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn build_ruleset(&self) -> Result<SymptomRuleset, DefinitionError> {
        let rules = self.rules.iter().cloned().map(RuleDefinition::into_rule);
        Ok(SymptomRuleset::new(rules)?)
    }

    pub fn evaluation_function(&self) -> Result<Option<EvaluationFunction>, DefinitionError> {
        Ok(self
            .evaluation
            .as_ref()
            .map(EvaluationFunction::resolve)
            .transpose()?)
    }

    pub fn confidence_function(&self) -> Result<Option<ConfidenceFunction>, DefinitionError> {
        Ok(self
            .confidence
            .as_ref()
            .map(ConfidenceFunction::resolve)
            .transpose()?)
    }
}
