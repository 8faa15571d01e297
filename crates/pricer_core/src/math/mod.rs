//! Mathematical utilities shared by the pricing and hedging layers.
//!
//! - `smoothing`: differentiable surrogates for kinks and indicators
//! - `linalg`: normal-equation least squares for small regressions

pub mod linalg;
pub mod smoothing;
