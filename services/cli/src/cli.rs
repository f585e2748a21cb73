use crate::commands::{run_batch, run_evaluate, BatchArgs, EvaluateArgs};
use crate::demo::{run_demo, DemoArgs};
use clap::{Args, Parser, Subcommand};
use symptom_rules::config::AppConfig;
use symptom_rules::error::AppError;
use symptom_rules::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "symptom-rules",
    about = "Evaluate weighted symptom rules against input snapshots from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one JSON snapshot against a rule definition file
    Evaluate(EvaluateArgs),
    /// Evaluate every row of a CSV file, in order, printing one JSON line per row
    Batch(BatchArgs),
    /// Run the built-in demo ruleset against sample snapshots (default command)
    Demo(DemoArgs),
}

/// Strategy overrides shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct StrategyArgs {
    /// Evaluation strategy name (default, binary_simple, multiclass_simple, ...) or a JSON
    /// object such as '{"name": "binary_scoring_based", "score_threshold": 0.5}'
    #[arg(long)]
    pub(crate) evaluation: Option<String>,
    /// Confidence strategy name (weighted, entropy, rule_coverage)
    #[arg(long)]
    pub(crate) confidence: Option<String>,
    /// Pretty-print JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));
    info!(?config.environment, ?command, "symptom rules cli starting");

    match command {
        Command::Evaluate(args) => run_evaluate(args, &config),
        Command::Batch(args) => run_batch(args, &config),
        Command::Demo(args) => run_demo(args, &config),
    }
}
