use crate::diagnosis::rule::SymptomRule;

use super::evaluation::weighted_score;
use super::selection::{max_possible_weight, non_overlapping_rules};

const PROBABILITY_FLOOR: f64 = 1e-9;

/// Share of the best achievable non-overlapping weight that the applicable rules earned.
pub fn weighted_confidence(applicable: &[&SymptomRule], all: &[&SymptomRule]) -> f64 {
    if applicable.is_empty() {
        return 0.0;
    }

    let max_weight = max_possible_weight(all);
    if max_weight == 0.0 {
        return 0.0;
    }

    (weighted_score(applicable) / max_weight).clamp(0.0, 1.0)
}

/// Normalized Shannon entropy of the applicable rules' weight distribution.
///
/// The normalizer is the log of the non-overlapping rule count, or 1 when at most one such
/// rule exists.
pub fn entropy_confidence(applicable: &[&SymptomRule], all: &[&SymptomRule]) -> f64 {
    if applicable.is_empty() {
        return 0.0;
    }

    let weights: Vec<f64> = applicable
        .iter()
        .filter_map(|rule| rule.weight())
        .filter(|weight| *weight != 0.0)
        .collect();
    let total = weights.iter().fold(0.0, |sum, weight| sum + weight);
    if weights.is_empty() || total == 0.0 {
        return 0.0;
    }

    let entropy = weights
        .iter()
        .map(|weight| (weight / total).clamp(PROBABILITY_FLOOR, 1.0))
        .map(|probability| -probability * probability.ln())
        .fold(0.0, |sum, term| sum + term);

    let max_rules = non_overlapping_rules(all).len();
    let max_entropy = if max_rules > 1 {
        (max_rules as f64).ln()
    } else {
        1.0
    };

    (entropy / max_entropy).clamp(0.0, 1.0)
}

/// Applicable rule count relative to the size of the non-overlapping selection.
pub fn rule_coverage_confidence(applicable: &[&SymptomRule], all: &[&SymptomRule]) -> f64 {
    let max_rules = non_overlapping_rules(all).len();
    if max_rules == 0 {
        return 0.0;
    }

    (applicable.len() as f64 / max_rules as f64).min(1.0)
}
