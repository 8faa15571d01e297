//! Asian option payoffs.
//!
//! - **Arithmetic**: `max(A − K, 0)` with `A = (1/n) Σ S(tᵢ)`
//! - **Geometric**: `max(G − K, 0)` with `G = exp((1/n) Σ ln S(tᵢ))`
//!
//! The average runs over the monitoring points after inception
//! (t₁ … t_N); the spot at t₀ is excluded.

use std::fmt;
use std::str::FromStr;

use num_traits::Float;

use super::{OptionType, PathDependentPayoff, PathObserver};

/// Averaging convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Averaging {
    /// Arithmetic mean.
    #[default]
    Arithmetic,
    /// Geometric mean.
    Geometric,
}

impl fmt::Display for Averaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Averaging::Arithmetic => "arithmetic",
            Averaging::Geometric => "geometric",
        })
    }
}

impl FromStr for Averaging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arithmetic" => Ok(Averaging::Arithmetic),
            "geometric" => Ok(Averaging::Geometric),
            _ => Err(format!("Unknown averaging: {}", s)),
        }
    }
}

/// Average-price option.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AsianPayoff {
    /// Averaging convention.
    pub averaging: Averaging,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: f64,
    /// Smoothing width (0 = exact).
    pub width: f64,
}

impl<T: Float> PathDependentPayoff<T> for AsianPayoff {
    fn compute(&self, observer: &PathObserver<T>) -> T {
        let average = match self.averaging {
            Averaging::Arithmetic => observer.arithmetic_average(),
            Averaging::Geometric => observer.geometric_average(),
        };
        self.option_type.payoff(
            average,
            T::from(self.strike).unwrap(),
            T::from(self.width).unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn payoff(averaging: Averaging, option_type: OptionType) -> AsianPayoff {
        AsianPayoff {
            averaging,
            option_type,
            strike: 100.0,
            width: 0.0,
        }
    }

    #[test]
    fn test_arithmetic_call() {
        let obs = PathObserver::from_prices(&[100.0, 110.0, 120.0]);
        assert_relative_eq!(payoff(Averaging::Arithmetic, OptionType::Call).compute(&obs), 10.0);
        assert_eq!(payoff(Averaging::Arithmetic, OptionType::Put).compute(&obs), 0.0);
    }

    #[test]
    fn test_geometric_below_arithmetic() {
        let obs = PathObserver::from_prices(&[80.0, 125.0, 110.0, 95.0]);
        let a: f64 = payoff(Averaging::Arithmetic, OptionType::Call).compute(&obs);
        let g: f64 = payoff(Averaging::Geometric, OptionType::Call).compute(&obs);
        assert!(g <= a);
    }

    #[test]
    fn test_constant_path() {
        let obs = PathObserver::from_prices(&[105.0; 6]);
        let a: f64 = payoff(Averaging::Arithmetic, OptionType::Call).compute(&obs);
        let g: f64 = payoff(Averaging::Geometric, OptionType::Call).compute(&obs);
        assert_relative_eq!(a, 5.0, epsilon = 1e-12);
        assert_relative_eq!(g, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_averaging() {
        assert_eq!("Geometric".parse::<Averaging>().unwrap(), Averaging::Geometric);
        assert!("harmonic".parse::<Averaging>().is_err());
    }
}
