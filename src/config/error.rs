//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Service base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Exchange ceiling must be at least 1")]
    InvalidExchangeCeiling,

    #[error("At least one terminal step is required")]
    NoTerminalSteps,

    #[error("Step ids cannot be blank")]
    BlankStepId,

    #[error("History deduplication window must be positive")]
    InvalidDedupWindow,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
