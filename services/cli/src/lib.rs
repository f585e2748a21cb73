mod cli;
mod commands;
mod demo;

use symptom_rules::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
