use std::env;
use std::fmt;
use std::str::FromStr;

use crate::diagnosis::{ConfidenceFunction, EvaluationFunction, StrategyError};

/// Distinguishes runtime behavior for different stages of deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub evaluation: EvaluationSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let evaluation_function: EvaluationFunction = strategy_var("APP_EVALUATION_FUNCTION")?;
        let confidence_function: ConfidenceFunction = strategy_var("APP_CONFIDENCE_FUNCTION")?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            evaluation: EvaluationSettings {
                evaluation_function,
                confidence_function,
            },
        })
    }
}

/// Parses a strategy name from `variable`, falling back to the default when unset.
fn strategy_var<T>(variable: &'static str) -> Result<T, ConfigError>
where
    T: FromStr<Err = StrategyError> + Default,
{
    match env::var(variable) {
        Ok(name) => name
            .parse()
            .map_err(|source| ConfigError::InvalidStrategy { variable, source }),
        Err(_) => Ok(T::default()),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Strategies used by evaluators built from configuration.
#[derive(Debug, Clone, Default)]
pub struct EvaluationSettings {
    pub evaluation_function: EvaluationFunction,
    pub confidence_function: ConfidenceFunction,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidStrategy {
        variable: &'static str,
        source: StrategyError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStrategy { variable, source } => {
                write!(f, "{variable} does not name a known strategy: {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidStrategy { source, .. } => Some(source),
        }
    }
}
