use serde_json::{json, Map, Value};

use super::common::*;
use crate::config::EvaluationSettings;
use crate::diagnosis::{
    ConfidenceFunction, Evaluation, EvaluationFunction, Evaluator, EvaluatorError,
    ScoreTransform, StrategyError, SymptomRuleset,
};

#[test]
fn new_evaluator_starts_unevaluated() {
    let ruleset = ruleset();
    let evaluator = Evaluator::new(&ruleset);

    assert!(std::ptr::eq(evaluator.ruleset(), &ruleset));
    assert!(evaluator.data().is_none());
    assert_eq!(evaluator.diagnosis().total_score(), None);
    assert_eq!(evaluator.diagnosis().label(), None);
    assert_eq!(evaluator.diagnosis().confidence(), None);
    assert_eq!(evaluator.evaluation_function().name(), "default");
    assert_eq!(evaluator.confidence_function().name(), "weighted");
}

#[test]
fn evaluate_uses_stored_data_with_default_strategies() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset).with_data(all_present());

    evaluator.evaluate(None).expect("stored data evaluates");

    let diagnosis = evaluator.diagnosis();
    assert_close(diagnosis.total_score().expect("score set"), 10.0);
    assert_eq!(diagnosis.label(), Some("High"));
    assert_close(diagnosis.confidence().expect("confidence set"), 1.0);
}

#[test]
fn run_evaluates_and_returns_results() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset);

    let results = evaluator.run(without_critical()).expect("evaluation succeeds");
    assert_close(results.total_score().expect("score set"), 6.5);
    assert_eq!(results.label(), Some("Medium"));
    assert_close(results.confidence().expect("confidence set"), 0.65);

    assert_eq!(evaluator.data(), Some(&without_critical()));
}

#[test]
fn each_evaluation_overwrites_the_previous_state() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset);

    evaluator.run(all_present()).expect("first run");
    let results = evaluator.run(none_present()).expect("second run");

    assert_eq!(results.total_score(), Some(0.0));
    assert_eq!(results.label(), Some("Low"));
    assert_eq!(results.confidence(), Some(0.0));
    assert_eq!(evaluator.data(), Some(&none_present()));
}

#[test]
fn custom_confidence_functions_are_accepted() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset)
        .with_confidence_function(ConfidenceFunction::custom(|_applicable, _all| 1.0));

    let results = evaluator.run(all_present()).expect("evaluation succeeds");
    assert!(results.total_score().expect("score set") > 0.0);
    assert_eq!(results.confidence(), Some(1.0));
}

#[test]
fn custom_evaluations_extend_the_diagnosis() {
    let ruleset = ruleset();
    let mut fields = Map::new();
    fields.insert("additional_field".to_string(), Value::Null);
    fields.insert("reviewed".to_string(), json!(false));

    let mut evaluator = Evaluator::new(&ruleset)
        .with_evaluation_function(EvaluationFunction::custom(|_applicable, _all| {
            Ok(Evaluation::new("Custom", 100.0).with_field("additional_field", "Custom"))
        }))
        .with_diagnosis_fields(fields);

    assert_eq!(evaluator.diagnosis().field("additional_field"), Some(&Value::Null));

    let results = evaluator.run(all_present()).expect("evaluation succeeds");
    assert_eq!(results.label(), Some("Custom"));
    assert_eq!(results.total_score(), Some(100.0));
    assert_eq!(results.field("additional_field"), Some(&json!("Custom")));
    assert_eq!(results.field("reviewed"), Some(&json!(false)));

    let serialized = serde_json::to_value(results).expect("diagnosis serializes");
    assert_eq!(serialized["additional_field"], json!("Custom"));
    assert_eq!(serialized["total_score"], json!(100.0));
}

#[test]
fn extension_fields_cannot_shadow_core_fields() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset).with_evaluation_function(
        EvaluationFunction::custom(|_applicable, _all| {
            Ok(Evaluation::new("Custom", 1.0).with_field("label", "Shadow"))
        }),
    );

    let results = evaluator.run(all_present()).expect("evaluation succeeds");
    assert_eq!(results.label(), Some("Custom"));
    assert!(results.field("label").is_none());
    assert!(results.extra().is_empty());
}

#[test]
fn empty_diagnosis_serializes_a_positive_zero_score() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset);

    let results = evaluator.run(none_present()).expect("evaluation succeeds");
    let score = results.total_score().expect("score set");
    assert!(!score.is_sign_negative());

    let serialized = serde_json::to_string(results).expect("diagnosis serializes");
    assert!(serialized.contains("\"total_score\":0.0"), "{serialized}");
}

#[test]
fn evaluate_without_data_is_a_usage_error() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset);

    let err = evaluator.evaluate(None).expect_err("no data");
    assert_eq!(err, EvaluatorError::NoData);
    assert_eq!(err.to_string(), "no data provided for evaluation");
}

#[test]
fn results_before_evaluation_are_a_usage_error() {
    let ruleset = ruleset();
    let evaluator = Evaluator::new(&ruleset).with_data(all_present());

    let err = evaluator.get_results().expect_err("not evaluated");
    assert_eq!(err, EvaluatorError::NotEvaluated);
    assert_eq!(err.to_string(), "evaluation has not been performed yet");
}

#[test]
fn strategy_failures_surface_without_replacing_the_diagnosis() {
    let ruleset = ruleset();
    let mut evaluator = Evaluator::new(&ruleset).with_evaluation_function(
        EvaluationFunction::MulticlassScoringBased {
            score_function: ScoreTransform::Identity,
            threshold_label_map: Vec::new(),
        },
    );

    let err = evaluator.run(all_present()).expect_err("empty map rejected");
    assert_eq!(err, EvaluatorError::Strategy(StrategyError::EmptyThresholdMap));
    assert!(evaluator.get_results().is_err());
}

#[test]
fn settings_select_the_strategies() {
    let ruleset = ruleset();
    let settings = EvaluationSettings {
        evaluation_function: EvaluationFunction::BinarySimple,
        confidence_function: ConfidenceFunction::RuleCoverage,
    };
    let mut evaluator = Evaluator::from_settings(&ruleset, &settings);

    let results = evaluator.run(without_critical()).expect("evaluation succeeds");
    assert_eq!(results.label(), Some("High"));
    assert_close(results.confidence().expect("confidence set"), 2.0 / 3.0);
}

#[test]
fn overlapping_rules_are_counted_once() {
    let ruleset = SymptomRuleset::new(overlapping_rules()).expect("unique");
    let mut evaluator = Evaluator::new(&ruleset);

    let results = evaluator
        .run(json!({"symptom1": true, "symptom2": true, "symptom3": false}))
        .expect("evaluation succeeds");

    assert_eq!(results.total_score(), Some(4.0));
    assert_eq!(results.label(), Some("Medium"));
    assert_close(results.confidence().expect("confidence set"), 0.8);
}
