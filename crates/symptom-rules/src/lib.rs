//! Weighted, condition-based rule evaluation.
//!
//! A [`SymptomRuleset`] resolves which rules apply to a [`Snapshot`] of input data, dropping
//! rules subsumed by a more specific applicable rule. An [`Evaluator`] turns those rules into a
//! [`Diagnosis`] through pluggable evaluation and confidence strategies.

pub mod config;
pub mod diagnosis;
pub mod error;
pub mod telemetry;

pub use diagnosis::{
    ConfidenceFunction, Diagnosis, Evaluation, EvaluationFunction, Evaluator, EvaluatorError,
    RulesetError, Snapshot, StrategyError, SymptomRule, SymptomRuleset,
};
