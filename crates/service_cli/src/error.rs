//! CLI error types

use pricer_core::types::PricingError;
use pricer_optimiser::OptimiserError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Explicitly requested configuration file is missing
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration could not be loaded or deserialised
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Invalid command argument or setting
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Pricing failure
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Training or evaluation failure
    #[error("Optimiser error: {0}")]
    Optimiser(#[from] OptimiserError),

    /// Output serialisation failure
    #[error("Serialisation error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type
pub type Result<T> = std::result::Result<T, CliError>;
