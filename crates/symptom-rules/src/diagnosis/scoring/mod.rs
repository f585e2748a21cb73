//! Evaluation and confidence strategies.
//!
//! Every strategy is a pure function of the applicable rules and the full rule list. The
//! [`EvaluationFunction`] and [`ConfidenceFunction`] enums name the built-in strategies and
//! accept custom functions through their `Custom` variants.

pub mod confidence;
pub mod evaluation;
mod selection;
mod strategy;

pub use selection::{max_possible_weight, non_overlapping_rules};
pub use strategy::{
    ConfidenceFn, ConfidenceFunction, EvaluationFn, EvaluationFunction, ScoreTransform,
    StrategyError,
};
