use crate::cli::StrategyArgs;
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use symptom_rules::config::{AppConfig, EvaluationSettings};
use symptom_rules::diagnosis::{
    snapshots_from_csv, ConfidenceFunction, Diagnosis, EvaluationFunction, Evaluator,
    RulesetDefinition, Snapshot, SymptomRuleset,
};
use symptom_rules::error::AppError;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Rule definition file (JSON)
    #[arg(long)]
    pub(crate) rules: PathBuf,
    /// Snapshot file (JSON). Reads stdin when omitted.
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) strategy: StrategyArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Rule definition file (JSON)
    #[arg(long)]
    pub(crate) rules: PathBuf,
    /// CSV file with a header row; each row is one snapshot
    #[arg(long)]
    pub(crate) csv: PathBuf,
    #[command(flatten)]
    pub(crate) strategy: StrategyArgs,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiagnosisReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) row: Option<usize>,
    pub(crate) applicable_rules: Vec<String>,
    pub(crate) diagnosis: &'a Diagnosis,
}

pub(crate) fn run_evaluate(args: EvaluateArgs, config: &AppConfig) -> Result<(), AppError> {
    let EvaluateArgs {
        rules,
        data,
        strategy,
    } = args;

    let definition = RulesetDefinition::from_path(&rules)?;
    let ruleset = definition.build_ruleset()?;
    let settings = resolve_settings(&strategy, Some(&definition), &config.evaluation)?;
    let snapshot = read_snapshot(data)?;

    let mut evaluator = Evaluator::from_settings(&ruleset, &settings);
    let applicable_rules = applicable_names(&ruleset, &snapshot);
    let diagnosis = evaluator.run(snapshot)?;

    emit(
        &DiagnosisReport {
            row: None,
            applicable_rules,
            diagnosis,
        },
        strategy.pretty,
    )
}

pub(crate) fn run_batch(args: BatchArgs, config: &AppConfig) -> Result<(), AppError> {
    let BatchArgs {
        rules,
        csv,
        strategy,
    } = args;

    let definition = RulesetDefinition::from_path(&rules)?;
    let ruleset = definition.build_ruleset()?;
    let settings = resolve_settings(&strategy, Some(&definition), &config.evaluation)?;
    let snapshots = snapshots_from_csv(File::open(&csv)?)?;
    info!(rows = snapshots.len(), path = %csv.display(), "evaluating csv snapshots");

    let mut evaluator = Evaluator::from_settings(&ruleset, &settings);
    for (row, snapshot) in snapshots.into_iter().enumerate() {
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

/// Command-line flags win over the definition file, which wins over the environment.
pub(crate) fn resolve_settings(
    strategy: &StrategyArgs,
    definition: Option<&RulesetDefinition>,
    defaults: &EvaluationSettings,
) -> Result<EvaluationSettings, AppError> {
    let evaluation_function = match &strategy.evaluation {
        Some(raw) => EvaluationFunction::resolve(&flag_value(raw))?,
        None => definition
            .map(RulesetDefinition::evaluation_function)
            .transpose()?
            .flatten()
            .unwrap_or_else(|| defaults.evaluation_function.clone()),
    };

    let confidence_function = match &strategy.confidence {
        Some(raw) => ConfidenceFunction::resolve(&flag_value(raw))?,
        None => definition
            .map(RulesetDefinition::confidence_function)
            .transpose()?
            .flatten()
            .unwrap_or_else(|| defaults.confidence_function.clone()),
    };

    debug!(?evaluation_function, ?confidence_function, "strategies resolved");

    Ok(EvaluationSettings {
        evaluation_function,
        confidence_function,
    })
}

/// Strategy flags take either a bare name or a JSON strategy object.
fn flag_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) fn applicable_names(ruleset: &SymptomRuleset, snapshot: &Snapshot) -> Vec<String> {
    ruleset
        .get_applicable_rules(snapshot)
        .iter()
        .map(|rule| rule.name().to_string())
        .collect()
}

pub(crate) fn emit<T: Serialize>(report: &T, pretty: bool) -> Result<(), AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_snapshot(path: Option<PathBuf>) -> Result<Snapshot, AppError> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let value: Value = serde_json::from_str(&raw)?;
    Ok(Snapshot::new(value))
}
