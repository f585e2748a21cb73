use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data::{numeric, Snapshot};

/// Predicate deciding whether a rule applies when no field conditions are declared.
pub type ApplyCondition = Arc<dyn Fn(&Snapshot) -> bool + Send + Sync>;

/// Named, weighted applicability test over a data snapshot.
///
/// `conditions`, when present, is authoritative: every named field must exist and be truthy,
/// and an empty set always applies. `apply_condition` is consulted only when `conditions` is
/// absent. A rule declaring neither test never applies.
#[derive(Clone)]
pub struct SymptomRule {
    name: String,
    weight: Option<f64>,
    critical: bool,
    conditions: Option<BTreeSet<String>>,
    apply_condition: Option<ApplyCondition>,
}

impl SymptomRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: None,
            critical: false,
            conditions: None,
            apply_condition: None,
        }
    }

    pub fn with_weight(mut self, weight: impl Into<Option<f64>>) -> Self {
        self.weight = weight.into();
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn with_conditions<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_apply_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Snapshot) -> bool + Send + Sync + 'static,
    {
        self.apply_condition = Some(Arc::new(condition));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Weight used by ordering and greedy selection, where a missing weight counts as zero.
    pub fn weight_or_zero(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn conditions(&self) -> Option<&BTreeSet<String>> {
        self.conditions.as_ref()
    }

    pub fn has_apply_condition(&self) -> bool {
        self.apply_condition.is_some()
    }

    pub fn applies(&self, data: &Snapshot) -> bool {
        if let Some(conditions) = &self.conditions {
            return conditions.iter().all(|field| data.is_truthy(field));
        }

        match &self.apply_condition {
            Some(condition) => condition(data),
            None => false,
        }
    }

    /// True when both rules declare non-empty conditions and ours strictly contain theirs.
    pub fn is_more_specific_than(&self, other: &SymptomRule) -> bool {
        match (&self.conditions, &other.conditions) {
            (Some(ours), Some(theirs)) if !ours.is_empty() && !theirs.is_empty() => {
                theirs.len() < ours.len() && theirs.is_subset(ours)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for SymptomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymptomRule")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("critical", &self.critical)
            .field("conditions", &self.conditions)
            .field(
                "apply_condition",
                &self.apply_condition.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

/// Comparison applied by a [`FieldPredicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
        }
    }
}

/// Declarative field comparison, e.g. `symptom1 > 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
    /// Stand-in for the field when the snapshot does not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldPredicate {
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            default: None,
        }
    }

    pub fn or_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn matches(&self, data: &Snapshot) -> bool {
        let actual = match data.field(&self.field).or(self.default.as_ref()) {
            Some(actual) => actual,
            None => return false,
        };

        if let (Some(lhs), Some(rhs)) = (numeric(actual), numeric(&self.value)) {
            return lhs
                .partial_cmp(&rhs)
                .map(|ordering| self.op.accepts(ordering))
                .unwrap_or(false);
        }

        if let (Value::String(lhs), Value::String(rhs)) = (actual, &self.value) {
            return self.op.accepts(lhs.cmp(rhs));
        }

        match self.op {
            CompareOp::Eq => actual == &self.value,
            CompareOp::Ne => actual != &self.value,
            _ => false,
        }
    }
}

/// Serializable rule description used by rule definition files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub conditions: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub when: Vec<FieldPredicate>,
}

impl RuleDefinition {
    pub fn into_rule(self) -> SymptomRule {
        let RuleDefinition {
            name,
            weight,
            critical,
            conditions,
            when,
        } = self;

        let mut rule = SymptomRule::new(name)
            .with_weight(weight)
            .with_critical(critical);

        if let Some(conditions) = conditions {
            rule = rule.with_conditions(conditions);
        }

        if !when.is_empty() {
            rule = rule.with_apply_condition(move |data: &Snapshot| {
                when.iter().all(|predicate| predicate.matches(data))
            });
        }

        rule
    }
}
