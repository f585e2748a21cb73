use crate::cli::StrategyArgs;
use crate::commands::{applicable_names, emit, resolve_settings, DiagnosisReport};
use clap::Args;
use serde_json::{json, Map, Value};
use symptom_rules::config::AppConfig;
use symptom_rules::diagnosis::{
    CompareOp, Evaluator, FieldPredicate, Snapshot, SymptomRule, SymptomRuleset,
};
use symptom_rules::error::AppError;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) strategy: StrategyArgs,
    /// Attach an extra `source` field to every diagnosis
    #[arg(long)]
    pub(crate) source: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let DemoArgs { strategy, source } = args;

    let ruleset = demo_ruleset()?;
    let settings = resolve_settings(&strategy, None, &config.evaluation)?;

    let mut fields = Map::new();
    if let Some(source) = source {
        fields.insert("source".to_string(), Value::String(source));
    }

    let mut evaluator =
        Evaluator::from_settings(&ruleset, &settings).with_diagnosis_fields(fields);
    info!(
        rules = ruleset.len(),
        evaluation = settings.evaluation_function.name(),
        confidence = settings.confidence_function.name(),
        "running demo ruleset"
    );

    for (row, snapshot) in demo_snapshots().into_iter().enumerate() {
        let applicable_rules = applicable_names(&ruleset, &snapshot);
        let diagnosis = evaluator.run(snapshot)?;
        emit(
            &DiagnosisReport {
                row: Some(row + 1),
                applicable_rules,
                diagnosis,
            },
            strategy.pretty,
        )?;
    }

    Ok(())
}

fn demo_ruleset() -> Result<SymptomRuleset, AppError> {
    let high_fever = FieldPredicate::new("temperature", CompareOp::Gt, 38.5).or_default(37.0);

    let ruleset = SymptomRuleset::new([
        SymptomRule::new("high_fever")
            .with_weight(5.0)
            .with_apply_condition(move |data: &Snapshot| high_fever.matches(data)),
        SymptomRule::new("low_oxygen")
            .with_weight(3.5)
            .critical()
            .with_apply_condition(|data: &Snapshot| {
                data.number("oxygen_saturation")
                    .is_some_and(|saturation| saturation < 92.0)
            }),
        SymptomRule::new("cough")
            .with_weight(1.0)
            .with_conditions(["cough"]),
        SymptomRule::new("productive_cough")
            .with_weight(1.5)
            .with_conditions(["cough", "sputum"]),
    ])?;

    Ok(ruleset)
}

fn demo_snapshots() -> Vec<Snapshot> {
    vec![
        Snapshot::new(json!({
            "temperature": 39.2,
            "oxygen_saturation": 90,
            "cough": true,
            "sputum": true
        })),
        Snapshot::new(json!({
            "temperature": 39.0,
            "oxygen_saturation": 97,
            "cough": true,
            "sputum": false
        })),
        Snapshot::new(json!({
            "temperature": 36.8,
            "oxygen_saturation": 98,
            "cough": false
        })),
    ]
}
