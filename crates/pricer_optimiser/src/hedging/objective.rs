//! Risk measures applied to the terminal hedging P&L.
//!
//! Every measure maps a P&L sample to a scalar loss to be minimised and is
//! generic over `T: Float`, so the same code yields the loss (`f64`) and
//! its directional derivatives (`Dual64`).
//!
//! | Measure                 | Loss                                        |
//! |-------------------------|---------------------------------------------|
//! | `Variance`              | E[(X − E X)²]                               |
//! | `MeanSquared`           | E[X²]                                       |
//! | `ExpectedShortfall{α}`  | mean of the worst ⌈(1 − α)·n⌉ losses (−X)   |
//! | `Entropic{λ}`           | (1/λ)·ln E[exp(−λX)]                        |

use std::fmt;
use std::str::FromStr;

use num_traits::Float;

use crate::error::{OptimiserError, OptimiserResult};

/// Objective minimised by the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum RiskMeasure {
    /// P&L variance.
    #[default]
    Variance,
    /// Mean squared P&L.
    MeanSquared,
    /// Expected shortfall of the loss at confidence `level` ∈ (0, 1).
    ExpectedShortfall {
        /// Confidence level, e.g. 0.95
        level: f64,
    },
    /// Entropic risk with risk aversion λ > 0.
    Entropic {
        /// Risk aversion λ
        risk_aversion: f64,
    },
}

impl RiskMeasure {
    /// Short identifier.
    pub fn name(&self) -> &'static str {
        match self {
            RiskMeasure::Variance => "variance",
            RiskMeasure::MeanSquared => "mean-squared",
            RiskMeasure::ExpectedShortfall { .. } => "expected-shortfall",
            RiskMeasure::Entropic { .. } => "entropic",
        }
    }

    /// Checks the measure's parameter.
    pub fn validate(&self) -> OptimiserResult<()> {
        match *self {
            RiskMeasure::ExpectedShortfall { level } if !(level > 0.0 && level < 1.0) => Err(
                OptimiserError::InvalidConfig(format!(
                    "expected shortfall level must lie in (0, 1), got {}",
                    level
                )),
            ),
            RiskMeasure::Entropic { risk_aversion }
                if !(risk_aversion.is_finite() && risk_aversion > 0.0) =>
            {
                Err(OptimiserError::InvalidConfig(format!(
                    "risk aversion must be positive, got {}",
                    risk_aversion
                )))
            }
            _ => Ok(()),
        }
    }

    /// Loss of the P&L sample `pnl`.
    ///
    /// The expected-shortfall tail and the entropic shift are selected on
    /// primal values; derivatives flow through the selected samples.
    ///
    /// # Panics
    /// Panics if `pnl` is empty.
    pub fn evaluate<T: Float>(&self, pnl: &[T]) -> T {
        assert!(!pnl.is_empty(), "empty P&L sample");
        let n = T::from(pnl.len()).unwrap();
        match *self {
            RiskMeasure::Variance => {
                let m = mean(pnl.iter().copied(), n);
                mean(pnl.iter().map(|&x| (x - m) * (x - m)), n)
            }
            RiskMeasure::MeanSquared => mean(pnl.iter().map(|&x| x * x), n),
            RiskMeasure::ExpectedShortfall { level } => {
                let tail = tail_size(level, pnl.len());
                let mut losses: Vec<T> = pnl.iter().map(|&x| -x).collect();
                losses.sort_by(|a, b| {
                    primal(*b)
                        .partial_cmp(&primal(*a))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                losses[..tail].iter().fold(T::zero(), |a, &x| a + x) / T::from(tail).unwrap()
            }
            RiskMeasure::Entropic { risk_aversion } => {
                let lambda = T::from(risk_aversion).unwrap();
                let shift = pnl
                    .iter()
                    .map(|&x| primal(-lambda * x))
                    .fold(f64::NEG_INFINITY, f64::max);
                let shift = T::from(shift).unwrap();
                let sum = pnl
                    .iter()
                    .fold(T::zero(), |a, &x| a + (-lambda * x - shift).exp());
                ((sum / n).ln() + shift) / lambda
            }
        }
    }
}

#[inline]
fn mean<T: Float>(xs: impl Iterator<Item = T>, n: T) -> T {
    xs.fold(T::zero(), |a, x| a + x) / n
}

/// ⌈(1 − α)·n⌉ clamped to [1, n], tolerant to rounding in (1 − α)·n.
fn tail_size(level: f64, n: usize) -> usize {
    let exact = (1.0 - level) * n as f64;
    ((exact - 1e-9).ceil() as usize).clamp(1, n)
}

#[inline]
fn primal<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

impl fmt::Display for RiskMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskMeasure::ExpectedShortfall { level } => write!(f, "expected-shortfall:{}", level),
            RiskMeasure::Entropic { risk_aversion } => write!(f, "entropic:{}", risk_aversion),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for RiskMeasure {
    type Err = OptimiserError;

    /// Parses `variance`, `mean-squared`, `expected-shortfall[:level]` or
    /// `entropic[:risk_aversion]` (defaults 0.95 and 1.0).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let value = |default: f64| -> OptimiserResult<f64> {
            arg.map_or(Ok(default), |a| {
                a.trim().parse::<f64>().map_err(|_| {
                    OptimiserError::InvalidConfig(format!("bad risk measure argument '{}'", a))
                })
            })
        };
        let measure = match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "variance" => RiskMeasure::Variance,
            "mean-squared" | "mse" => RiskMeasure::MeanSquared,
            "expected-shortfall" | "es" | "cvar" => RiskMeasure::ExpectedShortfall {
                level: value(0.95)?,
            },
            "entropic" => RiskMeasure::Entropic {
                risk_aversion: value(1.0)?,
            },
            other => {
                return Err(OptimiserError::InvalidConfig(format!(
                    "unknown risk measure '{}'",
                    other
                )))
            }
        };
        measure.validate()?;
        Ok(measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::Dual64;

    const SAMPLE: [f64; 5] = [1.0, -2.0, 3.0, 0.5, -1.5];

    #[test]
    fn test_variance_and_mean_squared() {
        let mean = 0.2;
        let var = SAMPLE.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 5.0;
        assert_relative_eq!(RiskMeasure::Variance.evaluate(&SAMPLE), var, epsilon = 1e-12);
        let ms = SAMPLE.iter().map(|x| x * x).sum::<f64>() / 5.0;
        assert_relative_eq!(RiskMeasure::MeanSquared.evaluate(&SAMPLE), ms, epsilon = 1e-12);
    }

    #[test]
    fn test_expected_shortfall_averages_worst_losses() {
        // 40% tail of 5 samples → worst 2 losses: 2.0 and 1.5
        let es = RiskMeasure::ExpectedShortfall { level: 0.6 }.evaluate(&SAMPLE);
        assert_relative_eq!(es, 1.75, epsilon = 1e-12);
        // Tiny tail still keeps one sample.
        let es = RiskMeasure::ExpectedShortfall { level: 0.999 }.evaluate(&SAMPLE);
        assert_relative_eq!(es, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entropic_limits() {
        // Small λ → expected loss
        let e = RiskMeasure::Entropic { risk_aversion: 1e-6 }.evaluate(&SAMPLE);
        assert_relative_eq!(e, -0.2, epsilon = 1e-5);
        // Constant P&L c → −c for any λ
        let e = RiskMeasure::Entropic { risk_aversion: 50.0 }.evaluate(&[2.0, 2.0, 2.0]);
        assert_relative_eq!(e, -2.0, epsilon = 1e-12);
        // Large λ stays finite thanks to the shift.
        assert!(RiskMeasure::Entropic { risk_aversion: 1e3 }
            .evaluate(&SAMPLE)
            .is_finite());
    }

    #[test]
    fn test_variance_derivative_through_duals() {
        // d/dc Var(X + c·Y) at c = 0 = 2 Cov(X, Y)
        let y = [0.5, 1.0, -1.0, 2.0, 0.0];
        let pnl: Vec<Dual64> = SAMPLE
            .iter()
            .zip(&y)
            .map(|(&x, &yi)| Dual64::new(x, yi))
            .collect();
        let d = RiskMeasure::Variance.evaluate(&pnl).eps;
        let mx = 0.2;
        let my = 2.5 / 5.0;
        let cov = SAMPLE
            .iter()
            .zip(&y)
            .map(|(x, yi)| (x - mx) * (yi - my))
            .sum::<f64>()
            / 5.0;
        assert_relative_eq!(d, 2.0 * cov, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_and_validate() {
        assert_eq!("variance".parse::<RiskMeasure>().unwrap(), RiskMeasure::Variance);
        assert_eq!(
            "mean_squared".parse::<RiskMeasure>().unwrap(),
            RiskMeasure::MeanSquared
        );
        assert_eq!(
            "expected-shortfall:0.9".parse::<RiskMeasure>().unwrap(),
            RiskMeasure::ExpectedShortfall { level: 0.9 }
        );
        assert_eq!(
            "entropic".parse::<RiskMeasure>().unwrap(),
            RiskMeasure::Entropic { risk_aversion: 1.0 }
        );
        assert!("es:1.5".parse::<RiskMeasure>().is_err());
        assert!("entropic:-1".parse::<RiskMeasure>().is_err());
        assert!("sharpe".parse::<RiskMeasure>().is_err());
        let es = RiskMeasure::ExpectedShortfall { level: 0.95 };
        assert_eq!(es.to_string().parse::<RiskMeasure>().unwrap(), es);
    }
}
