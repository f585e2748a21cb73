use serde_json::json;

use crate::diagnosis::{CompareOp, FieldPredicate, Snapshot, SymptomRule, SymptomRuleset};

/// Three predicate rules: `symptom1 > 1`, critical `symptom2 < 1`, and truthy `symptom3`.
pub(super) fn rules_with_conditions() -> Vec<SymptomRule> {
    let symptom1 = FieldPredicate::new("symptom1", CompareOp::Gt, 1).or_default(0);
    let symptom2 = FieldPredicate::new("symptom2", CompareOp::Lt, 1).or_default(0);

    vec![
        SymptomRule::new("rule1")
            .with_weight(5.0)
            .with_apply_condition(move |data| symptom1.matches(data)),
        SymptomRule::new("rule2")
            .with_weight(3.5)
            .critical()
            .with_apply_condition(move |data| symptom2.matches(data)),
        SymptomRule::new("rule3")
            .with_weight(1.5)
            .with_apply_condition(|data| data.is_truthy("symptom3")),
    ]
}

pub(super) fn ruleset() -> SymptomRuleset {
    SymptomRuleset::new(rules_with_conditions()).expect("fixture names are unique")
}

/// Rules keyed on field conditions, where `narrow` is more specific than `broad` and `twin`.
pub(super) fn overlapping_rules() -> Vec<SymptomRule> {
    vec![
        SymptomRule::new("broad")
            .with_weight(2.0)
            .with_conditions(["symptom1"]),
        SymptomRule::new("narrow")
            .with_weight(4.0)
            .with_conditions(["symptom1", "symptom2"]),
        SymptomRule::new("other")
            .with_weight(1.0)
            .with_conditions(["symptom3"]),
        SymptomRule::new("twin")
            .with_weight(1.0)
            .with_conditions(["symptom1"]),
    ]
}

pub(super) fn all_present() -> Snapshot {
    Snapshot::new(json!({"symptom1": 2, "symptom2": 0.3, "symptom3": true}))
}

pub(super) fn without_critical() -> Snapshot {
    Snapshot::new(json!({"symptom1": 2, "symptom2": 2, "symptom3": true}))
}

pub(super) fn none_present() -> Snapshot {
    Snapshot::new(json!({"symptom1": 0.5, "symptom2": 2, "symptom3": false}))
}

pub(super) fn snapshot(value: serde_json::Value) -> Snapshot {
    Snapshot::new(value)
}

/// Filters `rules` by direct applicability, without overlap resolution.
pub(super) fn applicable<'r>(rules: &'r [SymptomRule], data: &Snapshot) -> Vec<&'r SymptomRule> {
    rules.iter().filter(|rule| rule.applies(data)).collect()
}

pub(super) fn refs(rules: &[SymptomRule]) -> Vec<&SymptomRule> {
    rules.iter().collect()
}

pub(super) fn names(rules: &[&SymptomRule]) -> Vec<String> {
    rules.iter().map(|rule| rule.name().to_string()).collect()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
