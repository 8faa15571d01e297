//! Payoff evaluation over simulated paths.
//!
//! # Key Components
//!
//! - [`PathObserver`]: streaming statistics of one path (average, extrema, terminal)
//! - [`PathDependentPayoff`]: per-path payoff computed from an observer
//! - [`PayoffSpec`]: the closed set of priced contracts and their dispatch
//! - [`AmericanExercise`]: Longstaff-Schwartz early exercise
//!
//! Every payoff is generic over `T: Float` and takes a smoothing width: 0
//! gives the exact contract, a positive width replaces kinks and jumps with
//! differentiable surrogates of that width (in price units).

mod american;
mod asian;
mod barrier;
mod lookback;
mod observer;
mod payoff;
mod payoff_spec;

pub use american::AmericanExercise;
pub use asian::{AsianPayoff, Averaging};
pub use barrier::{BarrierPayoff, BarrierType};
pub use lookback::{LookbackPayoff, LookbackType};
pub use observer::PathObserver;
pub use payoff::{EuropeanPayoff, OptionType, PathDependentPayoff};
pub use payoff_spec::{PayoffKind, PayoffSpec};
