use std::collections::BTreeSet;

use crate::diagnosis::rule::SymptomRule;

/// Greedy maximal selection of rules whose conditions do not overlap.
///
/// Rules are visited by descending weight (stable, so ties keep ruleset order). A rule is
/// skipped when its non-empty conditions are already covered by earlier selections.
pub fn non_overlapping_rules<'r>(rules: &[&'r SymptomRule]) -> Vec<&'r SymptomRule> {
    let mut ordered = rules.to_vec();
    ordered.sort_by(|a, b| b.weight_or_zero().total_cmp(&a.weight_or_zero()));

    let mut covered: BTreeSet<&str> = BTreeSet::new();
    let mut selected = Vec::with_capacity(ordered.len());

    for rule in ordered {
        if let Some(conditions) = rule.conditions() {
            if !conditions.is_empty()
                && conditions
                    .iter()
                    .all(|field| covered.contains(field.as_str()))
            {
                continue;
            }
            covered.extend(conditions.iter().map(String::as_str));
        }
        selected.push(rule);
    }

    selected
}

/// Highest weight a single snapshot could earn without double-counting shared conditions.
pub fn max_possible_weight(rules: &[&SymptomRule]) -> f64 {
    non_overlapping_rules(rules)
        .iter()
        .map(|rule| rule.weight_or_zero())
        .fold(0.0, |total, weight| total + weight)
}
