use crate::diagnosis::outcome::Evaluation;
use crate::diagnosis::rule::SymptomRule;

use super::strategy::StrategyError;

pub const HIGH: &str = "High";
pub const MEDIUM: &str = "Medium";
pub const LOW: &str = "Low";

/// Sum of the declared weights; rules without a weight contribute nothing.
///
/// Folds from `+0.0` so an empty set scores a positive zero.
pub fn weighted_score(rules: &[&SymptomRule]) -> f64 {
    rules
        .iter()
        .filter_map(|rule| rule.weight())
        .fold(0.0, |total, weight| total + weight)
}

/// `High` when a critical rule applies, otherwise `Medium` for any positive score.
pub fn default_evaluation(applicable: &[&SymptomRule], _all: &[&SymptomRule]) -> Evaluation {
    let score = weighted_score(applicable);
    let label = if applicable.iter().any(|rule| rule.is_critical()) {
        HIGH
    } else if score > 0.0 {
        MEDIUM
    } else {
        LOW
    };

    Evaluation::new(label, score)
}

/// `High` once the score reaches half of the total declared weight.
pub fn binary_simple(applicable: &[&SymptomRule], all: &[&SymptomRule]) -> Evaluation {
    let score = weighted_score(applicable);
    let label = if score >= weighted_score(all) / 2.0 {
        HIGH
    } else {
        LOW
    };

    Evaluation::new(label, score)
}

/// Transforms the raw score and compares it against `score_threshold`.
///
/// The reported score is the transformed value.
pub fn binary_scoring_based<F>(
    applicable: &[&SymptomRule],
    _all: &[&SymptomRule],
    score_function: F,
    score_threshold: f64,
) -> Evaluation
where
    F: Fn(f64) -> f64,
{
    let score = score_function(weighted_score(applicable));
    let label = if score >= score_threshold { HIGH } else { LOW };

    Evaluation::new(label, score)
}

/// Splits `[0, total weight]` into equal-width bins, one per label in ascending order.
///
/// Scores at or above the total take the last label. With no weight to earn at all the bins
/// have zero width and the first label is used.
pub fn multiclass_simple<S>(
    applicable: &[&SymptomRule],
    all: &[&SymptomRule],
    labels: &[S],
) -> Result<Evaluation, StrategyError>
where
    S: AsRef<str>,
{
    let last = labels
        .len()
        .checked_sub(1)
        .ok_or(StrategyError::EmptyLabels)?;
    let score = weighted_score(applicable);
    let total_possible = weighted_score(all);

    let index = if total_possible <= 0.0 {
        0
    } else if score >= total_possible {
        last
    } else {
        let width = total_possible / labels.len() as f64;
        ((score / width).floor().max(0.0) as usize).min(last)
    };

    Ok(Evaluation::new(labels[index].as_ref(), score))
}

/// Picks the label of the smallest threshold at or above the transformed score.
///
/// Scores beyond every threshold take the label of the largest one.
pub fn multiclass_scoring_based<F>(
    applicable: &[&SymptomRule],
    _all: &[&SymptomRule],
    score_function: F,
    threshold_label_map: &[(f64, String)],
) -> Result<Evaluation, StrategyError>
where
    F: Fn(f64) -> f64,
{
    if threshold_label_map.is_empty() {
        return Err(StrategyError::EmptyThresholdMap);
    }

    let score = score_function(weighted_score(applicable));

    let mut thresholds: Vec<&(f64, String)> = threshold_label_map.iter().collect();
    thresholds.sort_by(|a, b| a.0.total_cmp(&b.0));

    let label = thresholds
        .iter()
        .find(|(threshold, _)| *threshold >= score)
        .or_else(|| thresholds.last())
        .map(|(_, label)| label.as_str())
        .ok_or(StrategyError::EmptyThresholdMap)?;

    Ok(Evaluation::new(label, score))
}
