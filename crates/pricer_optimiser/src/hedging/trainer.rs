//! Hedging policy optimiser.
//!
//! # Iteration
//!
//! ```text
//! fresh draws ──► HedgeBatch (f64 scenarios, shared by all passes)
//!                   │
//!                   ├── f64 pass            → loss
//!                   └── Dual64 pass per θ_j → ∂loss/∂θ_j
//!                         │
//!             clip (global norm) ──► SGD / Adam step
//! ```
//!
//! One forward-mode pass per policy parameter gives the same gradient as
//! backpropagation through the unrolled hedge; the passes run in parallel
//! with the `parallel` feature.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_dual::Dual64;
use pricer_core::types::time::TimeGrid;
use pricer_core::types::PricingError;
use pricer_models::models::ModelParameters;
use pricer_pricing::path_dependent::PayoffSpec;
use pricer_pricing::rng::PricerRng;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::batch::HedgeBatch;
use super::config::TrainingConfig;
use super::policy::HedgingPolicy;
use crate::error::{OptimiserError, OptimiserResult};
use crate::solvers::{clip_gradient, global_norm};

/// Shared flag that stops a running training loop.
///
/// Checked between iterations only; an iteration in progress completes.
///
/// ```
/// use pricer_optimiser::hedging::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum StopReason {
    /// Iteration cap reached.
    #[default]
    MaxIterations,
    /// Windowed mean loss stopped moving.
    Converged,
    /// Cancellation token set.
    Cancelled,
    /// Non-finite loss or gradient.
    Diverged,
}

/// Loss and gradient history of a training run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingDiagnostics {
    /// Loss before each completed update
    pub loss_curve: Vec<f64>,
    /// Gradient norm before clipping, per completed update
    pub grad_norms: Vec<f64>,
    /// Completed updates
    pub iterations: usize,
    /// Termination cause
    pub stop_reason: StopReason,
}

impl TrainingDiagnostics {
    /// Last recorded loss.
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_curve.last().copied()
    }
}

/// Trained policy and its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    /// Policy after the last update
    pub policy: HedgingPolicy,
    /// Training history
    pub diagnostics: TrainingDiagnostics,
}

/// Fits a hedging policy by gradient descent on a risk measure of the
/// terminal hedging P&L.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::ModelParameters;
/// use pricer_optimiser::hedging::{HedgeTrainer, HedgingPolicy, TrainingConfig};
/// use pricer_pricing::path_dependent::{OptionType, PayoffSpec};
///
/// let config = TrainingConfig::builder()
///     .n_paths(500)
///     .n_steps(10)
///     .learning_rate(0.05)
///     .max_iterations(20)
///     .seed(3)
///     .build()
///     .unwrap();
/// let trainer = HedgeTrainer::new(config);
///
/// let params = ModelParameters::gbm(100.0, 0.2, 0.01);
/// let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
/// let outcome = trainer.train(&params, &call, HedgingPolicy::linear()).unwrap();
/// assert_eq!(outcome.diagnostics.iterations, outcome.diagnostics.loss_curve.len());
/// ```
#[derive(Debug, Clone)]
pub struct HedgeTrainer {
    config: TrainingConfig,
    cancellation: CancellationToken,
}

impl HedgeTrainer {
    /// Creates a trainer with its own cancellation token.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Uses `token` for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Handle that cancels this trainer.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains `policy` with a random stream seeded from the configuration
    /// (or from the OS when no seed is set).
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for a policy without trainable parameters or with
    ///   an inconsistent parameter vector
    /// - `Pricing` for invalid model or payoff inputs
    /// - `TrainingDiverged` when the loss or gradient becomes non-finite
    pub fn train(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        policy: HedgingPolicy,
    ) -> OptimiserResult<TrainingOutcome> {
        let mut rng = match self.config.seed() {
            Some(seed) => PricerRng::from_seed(seed),
            None => PricerRng::from_entropy(),
        };
        self.train_with_rng(params, payoff, policy, &mut rng)
    }

    /// Trains `policy`, drawing every batch from `rng`.
    pub fn train_with_rng(
        &self,
        params: &ModelParameters,
        payoff: &PayoffSpec,
        mut policy: HedgingPolicy,
        rng: &mut PricerRng,
    ) -> OptimiserResult<TrainingOutcome> {
        self.config.validate()?;
        policy.validate()?;
        payoff.validate()?;
        if policy.n_params() == 0 {
            return Err(OptimiserError::InvalidConfig(format!(
                "{} policy has no trainable parameters",
                policy.name()
            )));
        }
        let grid =
            TimeGrid::uniform(payoff.maturity, self.config.n_steps()).map_err(PricingError::from)?;
        let mut optimiser = self
            .config
            .optimizer_type()
            .build(self.config.learning_rate(), policy.n_params());
        let mut diagnostics = TrainingDiagnostics::default();

        debug!(
            policy = policy.name(),
            n_params = policy.n_params(),
            optimiser = optimiser.name(),
            risk_measure = %self.config.risk_measure(),
            seed = rng.seed(),
            "starting hedge training"
        );

        for iteration in 0..self.config.max_iterations() {
            if self.cancellation.is_cancelled() {
                diagnostics.stop_reason = StopReason::Cancelled;
                break;
            }

            let batch = HedgeBatch::simulate(
                params,
                payoff,
                &grid,
                self.config.n_paths(),
                self.config.antithetic(),
                rng,
            )?;
            let (loss, mut gradient) = self.loss_and_gradient(&batch, &policy);

            if !loss.is_finite() || gradient.iter().any(|g| !g.is_finite()) {
                warn!(iteration, loss, "hedge training diverged");
                diagnostics.stop_reason = StopReason::Diverged;
                return Err(OptimiserError::TrainingDiverged {
                    iteration,
                    diagnostics,
                });
            }

            let grad_norm = match self.config.max_grad_norm() {
                Some(max_norm) => clip_gradient(&mut gradient, max_norm),
                None => global_norm(&gradient),
            };
            debug!(iteration, loss, grad_norm, "training step");

            optimiser.step(policy.params_mut(), &gradient);
            diagnostics.loss_curve.push(loss);
            diagnostics.grad_norms.push(grad_norm);
            diagnostics.iterations = iteration + 1;

            if has_converged(
                &diagnostics.loss_curve,
                self.config.convergence_window(),
                self.config.convergence_tolerance(),
            ) {
                diagnostics.stop_reason = StopReason::Converged;
                break;
            }
        }

        info!(
            iterations = diagnostics.iterations,
            final_loss = ?diagnostics.final_loss(),
            stop_reason = ?diagnostics.stop_reason,
            "hedge training finished"
        );
        Ok(TrainingOutcome {
            policy,
            diagnostics,
        })
    }

    /// Loss and its gradient w.r.t. every policy parameter on one batch.
    fn loss_and_gradient(&self, batch: &HedgeBatch, policy: &HedgingPolicy) -> (f64, Vec<f64>) {
        let cost = self.config.transaction_cost_rate();
        let measure = self.config.risk_measure();
        let theta = policy.params();
        let loss = measure.evaluate(&batch.pnl(policy, theta, cost));

        let directional = |j: usize| -> f64 {
            let seeded: Vec<Dual64> = theta
                .iter()
                .enumerate()
                .map(|(i, &p)| Dual64::new(p, if i == j { 1.0 } else { 0.0 }))
                .collect();
            measure.evaluate(&batch.pnl(policy, &seeded, cost)).eps
        };

        #[cfg(feature = "parallel")]
        let gradient = (0..theta.len()).into_par_iter().map(directional).collect();
        #[cfg(not(feature = "parallel"))]
        let gradient = (0..theta.len()).map(directional).collect();

        (loss, gradient)
    }
}

/// |mean(last window) − mean(previous window)| < tolerance.
fn has_converged(losses: &[f64], window: usize, tolerance: f64) -> bool {
    if losses.len() < 2 * window {
        return false;
    }
    let n = losses.len();
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let recent = mean(&losses[n - window..]);
    let previous = mean(&losses[n - 2 * window..n - window]);
    (recent - previous).abs() < tolerance
}
