//! Train command implementation
//!
//! Trains a hedging policy on the configured model and payoff, then
//! evaluates it out of sample next to the unhedged position and, for a
//! single-asset GBM European, the Black-Scholes delta hedge.

use pricer_models::models::{ModelParameters, ParameterName, ProcessType};
use pricer_optimiser::hedging::{
    evaluate_policy, HedgeTrainer, HedgingPolicy, PolicyEvaluation, TrainingDiagnostics,
};
use pricer_pricing::path_dependent::{PayoffKind, PayoffSpec};
use pricer_pricing::rng::PricerRng;
use serde::Serialize;
use tracing::info;

use crate::config::{PolicyKind, Settings};
use crate::Result;

/// Output of the train command.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    /// Trained policy with its parameters
    pub policy: HedgingPolicy,
    /// Loss and gradient history
    pub diagnostics: TrainingDiagnostics,
    /// Out-of-sample statistics of the trained policy
    pub evaluation: PolicyEvaluation,
    /// Same scenarios hedged with the Black-Scholes delta, when applicable
    pub reference: Option<PolicyEvaluation>,
}

/// Run the train command
///
/// `policy` overrides the configured policy family.
pub fn run(settings: &Settings, policy: Option<PolicyKind>) -> Result<TrainReport> {
    let training = settings.training()?;
    let params = settings.model.parameters()?;
    let payoff = settings.payoff.payoff()?;
    let config = training.config()?;
    let initial = training.policy(policy)?;

    info!(
        policy = initial.name(),
        n_params = initial.n_params(),
        optimizer = %config.optimizer_type(),
        risk_measure = %config.risk_measure(),
        n_paths = config.n_paths(),
        "Starting training"
    );
    let outcome = HedgeTrainer::new(config).train(&params, &payoff, initial)?;

    let eval_config = training.evaluation_config()?;
    let eval_seed = training
        .evaluation_seed()
        .unwrap_or_else(|| PricerRng::from_entropy().seed());
    let evaluation = evaluate_policy(
        &outcome.policy,
        &params,
        &payoff,
        &eval_config,
        &mut PricerRng::from_seed(eval_seed),
    )?;
    let reference = match reference_policy(&params, &payoff)? {
        Some(delta) => Some(evaluate_policy(
            &delta,
            &params,
            &payoff,
            &eval_config,
            &mut PricerRng::from_seed(eval_seed),
        )?),
        None => None,
    };

    info!(
        iterations = outcome.diagnostics.iterations,
        stop_reason = ?outcome.diagnostics.stop_reason,
        hedged_std = evaluation.hedged.std_dev,
        unhedged_std = evaluation.unhedged.std_dev,
        "Training complete"
    );
    Ok(TrainReport {
        policy: outcome.policy,
        diagnostics: outcome.diagnostics,
        evaluation,
        reference,
    })
}

fn reference_policy(params: &ModelParameters, payoff: &PayoffSpec) -> Result<Option<HedgingPolicy>> {
    if params.process_type() != ProcessType::Gbm
        || params.n_assets() != 1
        || payoff.kind != PayoffKind::European
    {
        return Ok(None);
    }
    Ok(Some(HedgingPolicy::black_scholes(
        params.value(ParameterName::Volatility)?,
        params.value(ParameterName::Rate)?,
        payoff.option_type,
    )))
}
