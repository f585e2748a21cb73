use serde_json::{Map, Value};
use tracing::debug;

use super::data::Snapshot;
use super::outcome::Diagnosis;
use super::rule::SymptomRule;
use super::ruleset::SymptomRuleset;
use super::scoring::{ConfidenceFunction, EvaluationFunction, StrategyError};
use crate::config::EvaluationSettings;

/// Usage and configuration errors surfaced by [`Evaluator`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluatorError {
    #[error("no data provided for evaluation")]
    NoData,
    #[error("evaluation has not been performed yet")]
    NotEvaluated,
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// Runs a shared ruleset through the selected evaluation and confidence strategies.
///
/// The evaluator keeps the most recent input snapshot and diagnosis; each evaluation
/// overwrites both.
pub struct Evaluator<'a> {
    ruleset: &'a SymptomRuleset,
    data: Option<Snapshot>,
    evaluation_function: EvaluationFunction,
    confidence_function: ConfidenceFunction,
    diagnosis_fields: Map<String, Value>,
    diagnosis: Diagnosis,
}

impl<'a> Evaluator<'a> {
    pub fn new(ruleset: &'a SymptomRuleset) -> Self {
        Self {
            ruleset,
            data: None,
            evaluation_function: EvaluationFunction::default(),
            confidence_function: ConfidenceFunction::default(),
            diagnosis_fields: Map::new(),
            diagnosis: Diagnosis::default(),
        }
    }

    pub fn from_settings(ruleset: &'a SymptomRuleset, settings: &EvaluationSettings) -> Self {
        Self::new(ruleset)
            .with_evaluation_function(settings.evaluation_function.clone())
            .with_confidence_function(settings.confidence_function.clone())
    }

    pub fn with_data(mut self, data: impl Into<Snapshot>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_evaluation_function(mut self, function: EvaluationFunction) -> Self {
        self.evaluation_function = function;
        self
    }

    pub fn with_confidence_function(mut self, function: ConfidenceFunction) -> Self {
        self.confidence_function = function;
        self
    }

    /// Declares extension fields (with their defaults) that every diagnosis carries.
    pub fn with_diagnosis_fields(mut self, fields: Map<String, Value>) -> Self {
        self.diagnosis = Diagnosis::template(&fields);
        self.diagnosis_fields = fields;
        self
    }

    pub fn ruleset(&self) -> &SymptomRuleset {
        self.ruleset
    }

    pub fn data(&self) -> Option<&Snapshot> {
        self.data.as_ref()
    }

    /// Latest diagnosis record, possibly still unevaluated.
    pub fn diagnosis(&self) -> &Diagnosis {
        &self.diagnosis
    }

    pub fn evaluation_function(&self) -> &EvaluationFunction {
        &self.evaluation_function
    }

    pub fn confidence_function(&self) -> &ConfidenceFunction {
        &self.confidence_function
    }

    /// Evaluates `data`, or the stored snapshot when `data` is `None`.
    pub fn evaluate(&mut self, data: Option<Snapshot>) -> Result<(), EvaluatorError> {
        if let Some(data) = data {
            self.data = Some(data);
        }
        let data = self.data.as_ref().ok_or(EvaluatorError::NoData)?;

        let applicable = self.ruleset.get_applicable_rules(data);
        let all: Vec<&SymptomRule> = self.ruleset.rules().iter().collect();

        let evaluation = self.evaluation_function.apply(&applicable, &all)?;
        let confidence = self.confidence_function.apply(&applicable, &all);

        debug!(
            applicable = applicable.len(),
            score = evaluation.score,
            label = %evaluation.label,
            confidence,
            evaluation_function = self.evaluation_function.name(),
            confidence_function = self.confidence_function.name(),
            "evaluation complete"
        );

        self.diagnosis = Diagnosis::assemble(&self.diagnosis_fields, evaluation, confidence);
        Ok(())
    }

    pub fn run(&mut self, data: impl Into<Snapshot>) -> Result<&Diagnosis, EvaluatorError> {
        self.evaluate(Some(data.into()))?;
        self.get_results()
    }

    pub fn get_results(&self) -> Result<&Diagnosis, EvaluatorError> {
        if self.diagnosis.is_evaluated() {
            Ok(&self.diagnosis)
        } else {
            Err(EvaluatorError::NotEvaluated)
        }
    }
}
