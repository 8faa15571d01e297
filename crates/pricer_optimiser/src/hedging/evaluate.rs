//! Out-of-sample P&L statistics for a hedging policy.

use pricer_core::types::time::TimeGrid;
use pricer_core::types::PricingError;
use pricer_models::models::ModelParameters;
use pricer_pricing::path_dependent::PayoffSpec;
use pricer_pricing::rng::PricerRng;
use tracing::debug;

use super::batch::HedgeBatch;
use super::config::TrainingConfig;
use super::objective::RiskMeasure;
use super::policy::HedgingPolicy;
use crate::error::{OptimiserError, OptimiserResult};

/// Summary of a terminal P&L distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PnlSummary {
    /// Number of scenarios
    pub n_paths: usize,
    /// Mean P&L
    pub mean: f64,
    /// P&L standard deviation
    pub std_dev: f64,
    /// Configured risk measure of the P&L
    pub risk: f64,
    /// 95% value at risk of the loss
    pub value_at_risk_95: f64,
    /// 95% expected shortfall of the loss
    pub expected_shortfall_95: f64,
    /// Worst P&L
    pub min: f64,
    /// Best P&L
    pub max: f64,
}

impl PnlSummary {
    /// Summarises `pnl` under `measure`.
    ///
    /// # Panics
    /// Panics if `pnl` is empty.
    pub fn from_sample(pnl: &[f64], measure: RiskMeasure) -> Self {
        let n = pnl.len() as f64;
        let mean = pnl.iter().sum::<f64>() / n;
        let variance = pnl.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        let mut sorted = pnl.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let tail = ((0.05 * n - 1e-9).ceil() as usize).clamp(1, sorted.len());
        Self {
            n_paths: pnl.len(),
            mean,
            std_dev: variance.sqrt(),
            risk: measure.evaluate(pnl),
            value_at_risk_95: -sorted[tail - 1],
            expected_shortfall_95: RiskMeasure::ExpectedShortfall { level: 0.95 }.evaluate(pnl),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

/// P&L statistics of `policy` with and without hedging on one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyEvaluation {
    /// Hedged P&L
    pub hedged: PnlSummary,
    /// Same scenarios, no hedge
    pub unhedged: PnlSummary,
}

impl PolicyEvaluation {
    /// Hedged over unhedged variance.
    pub fn variance_ratio(&self) -> f64 {
        (self.hedged.std_dev / self.unhedged.std_dev).powi(2)
    }
}

/// Runs `policy` on a fresh batch drawn from `rng`, using the path count,
/// step count, transaction cost rate and risk measure of `config`.
///
/// Any policy can be evaluated, including the parameter-free reference
/// delta.
///
/// # Errors
///
/// - `InvalidConfig` for an inconsistent policy
/// - `Pricing` for invalid model or payoff inputs
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::ModelParameters;
/// use pricer_optimiser::hedging::{evaluate_policy, HedgingPolicy, TrainingConfig};
/// use pricer_pricing::path_dependent::{OptionType, PayoffSpec};
/// use pricer_pricing::rng::PricerRng;
///
/// let config = TrainingConfig::builder().n_paths(2_000).n_steps(50).build().unwrap();
/// let params = ModelParameters::gbm(100.0, 0.2, 0.0);
/// let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
/// let delta = HedgingPolicy::black_scholes(0.2, 0.0, OptionType::Call);
///
/// let eval = evaluate_policy(&delta, &params, &call, &config, &mut PricerRng::from_seed(9)).unwrap();
/// assert!(eval.variance_ratio() < 0.1);
/// ```
pub fn evaluate_policy(
    policy: &HedgingPolicy,
    params: &ModelParameters,
    payoff: &PayoffSpec,
    config: &TrainingConfig,
    rng: &mut PricerRng,
) -> OptimiserResult<PolicyEvaluation> {
    policy.validate()?;
    payoff.validate()?;
    let grid = TimeGrid::uniform(payoff.maturity, config.n_steps()).map_err(PricingError::from)?;
    let batch = HedgeBatch::simulate(
        params,
        payoff,
        &grid,
        config.n_paths(),
        config.antithetic(),
        rng,
    )?;
    let pnl = batch.pnl(policy, policy.params(), config.transaction_cost_rate());
    if pnl.iter().any(|v| !v.is_finite()) {
        return Err(OptimiserError::Pricing(PricingError::NumericalInstability(
            "non-finite hedged P&L".to_string(),
        )));
    }
    let measure = config.risk_measure();
    let evaluation = PolicyEvaluation {
        hedged: PnlSummary::from_sample(&pnl, measure),
        unhedged: PnlSummary::from_sample(&batch.unhedged_pnl(), measure),
    };
    debug!(
        policy = policy.name(),
        n_paths = batch.n_samples(),
        hedged_std = evaluation.hedged.std_dev,
        unhedged_std = evaluation.unhedged.std_dev,
        "policy evaluated"
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_pricing::path_dependent::OptionType;

    #[test]
    fn test_summary_statistics() {
        let pnl: Vec<f64> = (1..=100).map(|i| i as f64 - 50.5).collect();
        let s = PnlSummary::from_sample(&pnl, RiskMeasure::Variance);
        assert_eq!(s.n_paths, 100);
        assert_relative_eq!(s.mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.risk, s.std_dev * s.std_dev, epsilon = 1e-9);
        assert_eq!(s.min, -49.5);
        assert_eq!(s.max, 49.5);
        // Five worst outcomes: −49.5 .. −45.5
        assert_relative_eq!(s.value_at_risk_95, 45.5);
        assert_relative_eq!(s.expected_shortfall_95, 47.5);
    }

    #[test]
    fn test_zero_hedge_matches_unhedged() {
        let config = TrainingConfig::builder()
            .n_paths(500)
            .n_steps(10)
            .build()
            .unwrap();
        let eval = evaluate_policy(
            &HedgingPolicy::linear(),
            &ModelParameters::gbm(100.0, 0.3, 0.01),
            &PayoffSpec::european(OptionType::Put, 95.0, 1.0),
            &config,
            &mut PricerRng::from_seed(4),
        )
        .unwrap();
        assert_relative_eq!(eval.hedged.std_dev, eval.unhedged.std_dev, epsilon = 1e-12);
        assert_relative_eq!(eval.hedged.mean, 0.0, epsilon = 1e-9);
        assert_relative_eq!(eval.variance_ratio(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_costs_lower_the_mean() {
        let params = ModelParameters::gbm(100.0, 0.2, 0.0);
        let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
        let delta = HedgingPolicy::black_scholes(0.2, 0.0, OptionType::Call);
        let run = |cost: f64| {
            let config = TrainingConfig::builder()
                .n_paths(1_000)
                .n_steps(20)
                .transaction_cost_rate(cost)
                .build()
                .unwrap();
            evaluate_policy(&delta, &params, &call, &config, &mut PricerRng::from_seed(8)).unwrap()
        };
        let free = run(0.0);
        let costly = run(0.005);
        assert!(costly.hedged.mean < free.hedged.mean);
        assert_eq!(costly.unhedged, free.unhedged);
    }
}
