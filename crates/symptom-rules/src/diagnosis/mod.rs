//! Weighted rule evaluation producing a scored, labeled diagnosis.

pub mod data;
pub mod definition;
mod evaluator;
mod outcome;
pub mod rule;
mod ruleset;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use data::{snapshots_from_csv, Snapshot};
pub use definition::{DefinitionError, RulesetDefinition};
pub use evaluator::{Evaluator, EvaluatorError};
pub use outcome::{Diagnosis, Evaluation};
pub use rule::{ApplyCondition, CompareOp, FieldPredicate, RuleDefinition, SymptomRule};
pub use ruleset::{RulesetError, SymptomRuleset};
pub use scoring::{ConfidenceFunction, EvaluationFunction, ScoreTransform, StrategyError};
