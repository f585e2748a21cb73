use tracing::debug;

use super::data::Snapshot;
use super::rule::SymptomRule;

/// Error enumeration for ruleset mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesetError {
    #[error("rule '{0}' already exists in the ruleset")]
    DuplicateRule(String),
}

/// Ordered collection of uniquely named rules with overlap-aware resolution.
#[derive(Debug, Clone, Default)]
pub struct SymptomRuleset {
    rules: Vec<SymptomRule>,
}

impl SymptomRuleset {
    pub fn new<I>(rules: I) -> Result<Self, RulesetError>
    where
        I: IntoIterator<Item = SymptomRule>,
    {
        let mut ruleset = Self::default();
        for rule in rules {
            ruleset.add_rule(rule)?;
        }
        Ok(ruleset)
    }

    pub fn add_rule(&mut self, rule: SymptomRule) -> Result<(), RulesetError> {
        if self.position(rule.name()).is_some() {
            return Err(RulesetError::DuplicateRule(rule.name().to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Replaces the rule stored under `name`, keeping its position.
    ///
    /// Returns `Ok(None)` when no rule is registered under `name`.
    pub fn update_rule(
        &mut self,
        name: &str,
        rule: SymptomRule,
    ) -> Result<Option<&SymptomRule>, RulesetError> {
        let Some(index) = self.position(name) else {
            return Ok(None);
        };

        if rule.name() != name && self.position(rule.name()).is_some() {
            return Err(RulesetError::DuplicateRule(rule.name().to_string()));
        }

        self.rules[index] = rule;
        Ok(self.rules.get(index))
    }

    pub fn remove_rule(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get_rule(&self, name: &str) -> Option<&SymptomRule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn list_rules(&self) -> Vec<&str> {
        self.rules.iter().map(SymptomRule::name).collect()
    }

    pub fn rules(&self) -> &[SymptomRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolves the rules that apply to `data`, in ruleset order.
    ///
    /// A rule that applies is still dropped when another applicable rule is more specific than
    /// it (its conditions are a strict superset), so shared evidence is only counted once.
    pub fn get_applicable_rules(&self, data: &Snapshot) -> Vec<&SymptomRule> {
        let naive: Vec<&SymptomRule> =
            self.rules.iter().filter(|rule| rule.applies(data)).collect();

        naive
            .iter()
            .copied()
            .filter(|candidate| {
                match naive
                    .iter()
                    .find(|other| other.is_more_specific_than(candidate))
                {
                    Some(subsumer) => {
                        debug!(
                            rule = candidate.name(),
                            subsumed_by = subsumer.name(),
                            "excluding overlapping rule"
                        );
                        false
                    }
                    None => true,
                }
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name() == name)
    }
}
