//! # pricer_core: Foundation Layer for Differentiable Pricing and Hedging
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the pricer workspace, providing:
//! - Differentiable smoothing kernels (`math::smoothing`)
//! - Normal-equation least squares for small regressions (`math::linalg`)
//! - Dual and hyper-dual number aliases for forward-mode AD (`types::dual`)
//! - The generic `Float` bound shared by every differentiable routine (`traits`)
//! - The simulation/hedging time grid and day counts (`types::time`)
//! - The engine-wide error taxonomy (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates:
//! - num-traits: Traits for generic numerical computation
//! - num-dual: Dual number types for automatic differentiation
//! - chrono: Calendar-based time grids
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::smoothing::smooth_max;
//! use pricer_core::types::TimeGrid;
//!
//! let grid = TimeGrid::uniform(1.0, 4).unwrap();
//! assert_eq!(grid.n_steps(), 4);
//! assert!((grid.dt(0) - 0.25).abs() < 1e-12);
//!
//! let result = smooth_max(3.0_f64, 5.0_f64, 1e-6_f64);
//! # assert!((result - 5.0_f64).abs() < 1e-3);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `TimeGrid` and `DayCountConvention`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod traits;
pub mod types;
