//! Barrier option payoff implementations.
//!
//! - **Up-and-In**: active only if the path reaches the barrier from below
//! - **Up-and-Out**: void if the path reaches the barrier from below
//! - **Down-and-In**: active only if the path reaches the barrier from above
//! - **Down-and-Out**: void if the path reaches the barrier from above
//!
//! Monitoring is discrete on the simulation grid, inception included.
//!
//! # Smooth Approximations
//!
//! The crossing condition is `step(extremum − barrier, width)` for up
//! barriers and `step(barrier − extremum, width)` for down barriers: the exact
//! indicator at width 0, the logistic surrogate otherwise. Knock-in and
//! knock-out weights sum to one, so in + out = vanilla for every width.

use std::fmt;
use std::str::FromStr;

use num_traits::Float;
use pricer_core::math::smoothing::step;

use super::{OptionType, PathDependentPayoff, PathObserver};

/// Barrier type enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum BarrierType {
    /// Up-and-In
    UpIn,
    /// Up-and-Out
    UpOut,
    /// Down-and-In
    DownIn,
    /// Down-and-Out
    DownOut,
}

impl BarrierType {
    /// Returns true if this is an "up" barrier (uses path maximum).
    #[inline]
    pub fn is_up(&self) -> bool {
        matches!(self, BarrierType::UpIn | BarrierType::UpOut)
    }

    /// Returns true if this is an "in" barrier (knock-in).
    #[inline]
    pub fn is_in(&self) -> bool {
        matches!(self, BarrierType::UpIn | BarrierType::DownIn)
    }

    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BarrierType::UpIn => "up-in",
            BarrierType::UpOut => "up-out",
            BarrierType::DownIn => "down-in",
            BarrierType::DownOut => "down-out",
        }
    }
}

impl fmt::Display for BarrierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarrierType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "up-in" | "up-and-in" | "ui" => Ok(BarrierType::UpIn),
            "up-out" | "up-and-out" | "uo" => Ok(BarrierType::UpOut),
            "down-in" | "down-and-in" | "di" => Ok(BarrierType::DownIn),
            "down-out" | "down-and-out" | "do" => Ok(BarrierType::DownOut),
            _ => Err(format!("Unknown barrier type: {}", s)),
        }
    }
}

/// Knock-in / knock-out option on the terminal value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarrierPayoff {
    /// Barrier direction and knock type.
    pub barrier_type: BarrierType,
    /// Barrier level.
    pub barrier: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: f64,
    /// Smoothing width (0 = exact).
    pub width: f64,
}

impl BarrierPayoff {
    /// Weight in [0, 1] that the barrier was crossed.
    fn crossed<T: Float>(&self, observer: &PathObserver<T>) -> T {
        let barrier = T::from(self.barrier).unwrap();
        let width = T::from(self.width).unwrap();
        if self.barrier_type.is_up() {
            step(observer.maximum() - barrier, width)
        } else {
            step(barrier - observer.minimum(), width)
        }
    }
}

impl<T: Float> PathDependentPayoff<T> for BarrierPayoff {
    fn compute(&self, observer: &PathObserver<T>) -> T {
        let vanilla = self.option_type.payoff(
            observer.terminal(),
            T::from(self.strike).unwrap(),
            T::from(self.width).unwrap(),
        );
        let hit = self.crossed(observer);
        if self.barrier_type.is_in() {
            vanilla * hit
        } else {
            vanilla * (T::one() - hit)
        }
    }

    fn is_discontinuous(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn payoff(barrier_type: BarrierType, barrier: f64, width: f64) -> BarrierPayoff {
        BarrierPayoff {
            barrier_type,
            barrier,
            option_type: OptionType::Call,
            strike: 100.0,
            width,
        }
    }

    #[test]
    fn test_up_and_out_knocked() {
        let obs = PathObserver::from_prices(&[100.0, 125.0, 110.0]);
        assert_eq!(payoff(BarrierType::UpOut, 120.0, 0.0).compute(&obs), 0.0);
        assert_eq!(payoff(BarrierType::UpIn, 120.0, 0.0).compute(&obs), 10.0);
    }

    #[test]
    fn test_up_and_out_survives() {
        let obs = PathObserver::from_prices(&[100.0, 115.0, 110.0]);
        assert_eq!(payoff(BarrierType::UpOut, 120.0, 0.0).compute(&obs), 10.0);
        assert_eq!(payoff(BarrierType::UpIn, 120.0, 0.0).compute(&obs), 0.0);
    }

    #[test]
    fn test_down_barriers() {
        let obs = PathObserver::from_prices(&[100.0, 85.0, 104.0]);
        assert_eq!(payoff(BarrierType::DownOut, 90.0, 0.0).compute(&obs), 0.0);
        assert_eq!(payoff(BarrierType::DownIn, 90.0, 0.0).compute(&obs), 4.0);
    }

    #[test]
    fn test_in_plus_out_is_vanilla_when_smoothed() {
        let obs = PathObserver::from_prices(&[100.0, 119.0, 112.0]);
        let vanilla = OptionType::Call.payoff(112.0, 100.0, 1.0);
        for bt in [(BarrierType::UpIn, BarrierType::UpOut), (BarrierType::DownIn, BarrierType::DownOut)] {
            let inn: f64 = payoff(bt.0, 120.0, 1.0).compute(&obs);
            let out: f64 = payoff(bt.1, 120.0, 1.0).compute(&obs);
            assert_relative_eq!(inn + out, vanilla, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_flags_and_parse() {
        assert!(BarrierType::UpOut.is_up());
        assert!(!BarrierType::DownOut.is_in());
        assert_eq!("up_and_out".parse::<BarrierType>().unwrap(), BarrierType::UpOut);
        assert_eq!("DI".parse::<BarrierType>().unwrap(), BarrierType::DownIn);
        assert!("sideways".parse::<BarrierType>().is_err());
        let p: &dyn PathDependentPayoff<f64> = &payoff(BarrierType::UpIn, 1.0, 0.0);
        assert!(p.is_discontinuous());
    }
}
