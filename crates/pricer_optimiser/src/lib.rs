//! # pricer_optimiser
//!
//! Gradient optimisers and deep-hedging policy training.
//!
//! ## Architecture Position
//!
//! Layer 2.5 of the pricer stack. Depends on `pricer_core` (L1),
//! `pricer_models` (L2) and `pricer_pricing` (L3) for path simulation and
//! payoff evaluation.
//!
//! ## Modules
//!
//! - `solvers`: SGD with momentum, Adam, global-norm gradient clipping
//! - `hedging`: hedging policies, risk measures, the [`HedgeTrainer`](hedging::HedgeTrainer)
//!   and out-of-sample policy evaluation
//!
//! ## Example
//!
//! ```rust
//! use pricer_models::models::ModelParameters;
//! use pricer_optimiser::prelude::*;
//! use pricer_pricing::path_dependent::{OptionType, PayoffSpec};
//!
//! let config = TrainingConfig::builder()
//!     .n_paths(1_000)
//!     .n_steps(12)
//!     .optimizer_type(OptimizerType::Adam)
//!     .learning_rate(0.05)
//!     .max_iterations(30)
//!     .transaction_cost_rate(0.001)
//!     .seed(1)
//!     .build()?;
//!
//! let params = ModelParameters::gbm(100.0, 0.2, 0.01);
//! let call = PayoffSpec::european(OptionType::Call, 100.0, 1.0);
//! let outcome = HedgeTrainer::new(config).train(&params, &call, HedgingPolicy::linear())?;
//! assert_eq!(outcome.policy.n_params(), 4);
//! # Ok::<(), pricer_optimiser::OptimiserError>(())
//! ```

#![deny(missing_docs)]

pub mod hedging;
pub mod solvers;

mod error;

pub use error::{OptimiserError, OptimiserResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::hedging::*;
    pub use crate::solvers::*;
    pub use crate::{OptimiserError, OptimiserResult};
}
