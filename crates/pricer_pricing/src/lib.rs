//! # Pricer Pricing (Layer 3: Differentiable Engine)
//!
//! Monte Carlo pricing with sensitivities taken through the simulation
//! itself:
//!
//! - [`rng`]: seeded random sources and constant draw sets (antithetic pairs)
//! - [`mc`]: path simulation and the [`PricingEngine`](mc::PricingEngine)
//! - [`path_dependent`]: European, Asian, barrier, lookback and American payoffs
//! - [`greeks`]: sensitivity requests and [`PricingResult`](greeks::PricingResult)
//!
//! Every numeric path is generic over `num_traits::Float`; the same code
//! runs on `f64` for prices, `Dual64` for first-order and `HyperDual64` for
//! second-order sensitivities. Random draws never carry derivatives.
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::models::ModelParameters;
//! use pricer_pricing::mc::{GreekMode, MonteCarloConfig, PricingEngine};
//! use pricer_pricing::path_dependent::{Averaging, OptionType, PayoffSpec};
//!
//! let config = MonteCarloConfig::builder()
//!     .n_paths(5_000)
//!     .n_steps(12)
//!     .seed(1)
//!     .greek_mode(GreekMode::Autodiff)
//!     .build()
//!     .unwrap();
//! let engine = PricingEngine::new(config).unwrap();
//!
//! let params = ModelParameters::gbm(100.0, 0.25, 0.03);
//! let asian = PayoffSpec::asian(Averaging::Arithmetic, OptionType::Call, 100.0, 1.0);
//! let result = engine.price(&params, &asian).unwrap();
//! assert!(result.price > 0.0 && result.std_error > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unknown_lints)]

pub mod greeks;
pub mod mc;
pub mod path_dependent;
pub mod rng;
