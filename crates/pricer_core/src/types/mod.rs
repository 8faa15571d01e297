//! Core numeric, time, and error types.
//!
//! This module provides:
//! - `dual`: Dual and hyper-dual number aliases from num-dual for automatic differentiation
//! - `time`: The simulation time grid and day count conventions
//! - `error`: The structured error taxonomy shared by every pricer crate
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`TimeGrid`], [`DayCountConvention`] from `time`
//! - [`PricingError`] from `error`
//! - [`DualNumber`], [`HyperDualNumber`] from `dual`

pub mod dual;
pub mod error;
pub mod time;

pub use dual::{DualNumber, HyperDualNumber};
pub use error::PricingError;
pub use time::{DayCountConvention, TimeGrid};
