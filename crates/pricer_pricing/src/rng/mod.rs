//! # Random Number Generation
//!
//! - [`PricerRng`]: seeded PRNG handle (`rand::StdRng` + Ziggurat normals)
//! - [`DrawSet`]: pre-generated normal draws reused across pricing and
//!   sensitivity passes, with deterministic antithetic negation
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::{DrawSet, PricerRng};
//!
//! let mut rng = PricerRng::from_seed(12345);
//! let draws = DrawSet::generate(&mut rng, 1_000, 52, 1, true);
//! assert_eq!(draws.n_samples(), 1_000);
//! ```

mod draws;
mod prng;

pub use draws::DrawSet;
pub use prng::PricerRng;
