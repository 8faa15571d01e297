//! Check command implementation
//!
//! Loads and validates every configuration section without simulating.

use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::Result;

/// Summary of a validated configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// CLI version
    pub version: &'static str,
    /// Process family
    pub process_type: String,
    /// Number of simulated assets
    pub n_assets: usize,
    /// Contract family
    pub payoff: &'static str,
    /// Whether the payoff is discontinuous in the path
    pub discontinuous: bool,
    /// Pricing paths
    pub n_paths: usize,
    /// Pricing steps
    pub n_steps: usize,
    /// Greek computation mode
    pub greek_mode: String,
    /// Training summary when a `[training]` section is present
    pub training: Option<TrainingCheck>,
}

/// Validated training section.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingCheck {
    /// Policy family
    pub policy: &'static str,
    /// Trainable parameters
    pub n_params: usize,
    /// Gradient optimiser
    pub optimizer: String,
    /// Objective
    pub risk_measure: String,
}

/// Run the check command
pub fn run(settings: &Settings) -> Result<CheckReport> {
    let params = settings.model.parameters()?;
    let payoff = settings.payoff.payoff()?;
    let config = settings.simulation.config()?;
    settings.simulation.engine()?.time_grid(&payoff)?;
    info!("Model, payoff and simulation settings valid");

    let training = match &settings.training {
        Some(section) => {
            let training = section.config()?;
            section.evaluation_config()?;
            let policy = section.policy(None)?;
            info!("Training settings valid");
            Some(TrainingCheck {
                policy: policy.name(),
                n_params: policy.n_params(),
                optimizer: training.optimizer_type().to_string(),
                risk_measure: training.risk_measure().to_string(),
            })
        }
        None => None,
    };

    Ok(CheckReport {
        version: env!("CARGO_PKG_VERSION"),
        process_type: params.process_type().to_string(),
        n_assets: params.n_assets(),
        payoff: payoff.kind.name(),
        discontinuous: payoff.is_discontinuous(),
        n_paths: config.n_paths(),
        n_steps: config.n_steps(),
        greek_mode: config.greek_mode().to_string(),
        training,
    })
}
