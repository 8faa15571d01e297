//! Analytical pricing formulas for European options.
//!
//! - Black-Scholes prices and Greeks (reference values and the delta-hedge policy)
//! - Standard normal distribution functions
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`**: Supports both `f64` and `Dual64` for AD
//! - **Numerical Stability**: Double-precision normal CDF

pub mod black_scholes;
pub mod distributions;
pub mod error;

pub use black_scholes::BlackScholes;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
