//! # Pricer Models (L2: Business Logic)
//!
//! Stochastic process models and closed-form references for the hedging engine.
//!
//! This crate provides:
//! - Process models (GBM baskets, Heston, parametric local volatility)
//! - The `ModelParameters` registry that lifts named `f64` parameters into
//!   any AD scalar type
//! - Correlation matrices and their Cholesky factors
//! - Black-Scholes prices and Greeks for validation and delta hedging
//! - A linear factor model for residualising returns
//!
//! ## Design Principles
//!
//! - **Enum-based models** for static dispatch (`ProcessModel`)
//! - **Generic over `T: Float`** so `f64`, `Dual64` and `HyperDual64` share one code path
//! - **Reparameterisation over clamping** for volatility-like quantities

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod factor;
pub mod models;
