//! Monte Carlo simulation and the differentiable pricing engine.
//!
//! # Architecture
//!
//! ```text
//! PricingEngine
//! ├── MonteCarloConfig  (paths, steps, seed, antithetic, greek mode, smoothing, bumps)
//! ├── PricerRng         (caller-visible random source)
//! └── per call
//!     ├── DrawSet::generate()   constant draws, shared by every pass
//!     ├── simulate()            ProcessModel<T> → PathBatch<T>
//!     ├── PayoffSpec::evaluate  PathBatch<T> → per-sample payoffs
//!     └── sensitivities         Dual64 / HyperDual64 passes or bumps
//! ```
//!
//! # Activity
//!
//! | Input          | Scalar type  | Differentiated |
//! |----------------|--------------|----------------|
//! | model params   | `T`          | when requested |
//! | maturity       | `T`          | when requested |
//! | draws          | `f64`        | never          |
//! | contract terms | `f64`        | never          |

pub mod config;
pub mod error;
pub mod paths;
pub mod pricer;

pub use config::{
    BumpConfig, GreekMode, MonteCarloConfig, MonteCarloConfigBuilder, MAX_PATHS, MAX_STEPS,
};
pub use error::ConfigError;
pub use paths::{simulate, PathBatch};
pub use pricer::PricingEngine;
