//! Greeks: request types, results and the sensitivity extractor.
//!
//! A sensitivity request names one or two model inputs. Named Greeks are
//! shorthands over those requests:
//!
//! | Greek | Definition            |
//! |-------|-----------------------|
//! | delta | ∂V/∂spot              |
//! | gamma | ∂²V/∂spot²            |
//! | vega  | ∂V/∂volatility        |
//! | theta | −∂V/∂maturity         |
//! | rho   | ∂V/∂rate              |
//! | vanna | ∂²V/∂spot∂volatility  |
//! | volga | ∂²V/∂volatility²      |
//!
//! For baskets, per-asset Greeks are reported once per asset (`delta[0]`,
//! `delta[1]`, …); second-order per-asset Greeks are the diagonal terms.

use std::fmt;
use std::str::FromStr;

use pricer_models::models::ParameterName;

pub(crate) mod extractor;
mod result;

pub use result::PricingResult;

/// Named sensitivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Greek {
    /// ∂V/∂S
    Delta,
    /// ∂²V/∂S²
    Gamma,
    /// ∂V/∂σ
    Vega,
    /// −∂V/∂T
    Theta,
    /// ∂V/∂r
    Rho,
    /// ∂²V/∂S∂σ
    Vanna,
    /// ∂²V/∂σ²
    Volga,
}

impl Greek {
    /// Every named Greek.
    pub const ALL: [Greek; 7] = [
        Greek::Delta,
        Greek::Gamma,
        Greek::Vega,
        Greek::Theta,
        Greek::Rho,
        Greek::Vanna,
        Greek::Volga,
    ];

    /// Result key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Greek::Delta => "delta",
            Greek::Gamma => "gamma",
            Greek::Vega => "vega",
            Greek::Theta => "theta",
            Greek::Rho => "rho",
            Greek::Vanna => "vanna",
            Greek::Volga => "volga",
        }
    }

    /// True for gamma, vanna and volga.
    #[inline]
    pub fn is_second_order(&self) -> bool {
        matches!(self, Greek::Gamma | Greek::Vanna | Greek::Volga)
    }

    /// The underlying derivative request.
    pub fn sensitivity(&self) -> Sensitivity {
        use ParameterName::*;
        match self {
            Greek::Delta => Sensitivity::First(Spot),
            Greek::Gamma => Sensitivity::Second(Spot, Spot),
            Greek::Vega => Sensitivity::First(Volatility),
            Greek::Theta => Sensitivity::First(Maturity),
            Greek::Rho => Sensitivity::First(Rate),
            Greek::Vanna => Sensitivity::Second(Spot, Volatility),
            Greek::Volga => Sensitivity::Second(Volatility, Volatility),
        }
    }

    /// Sign applied to the raw derivative.
    #[inline]
    pub(crate) fn sign(&self) -> f64 {
        if matches!(self, Greek::Theta) {
            -1.0
        } else {
            1.0
        }
    }
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Greek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delta" => Ok(Greek::Delta),
            "gamma" => Ok(Greek::Gamma),
            "vega" => Ok(Greek::Vega),
            "theta" => Ok(Greek::Theta),
            "rho" => Ok(Greek::Rho),
            "vanna" => Ok(Greek::Vanna),
            "volga" | "vomma" => Ok(Greek::Volga),
            _ => Err(format!("Unknown greek: {}", s)),
        }
    }
}

/// Derivative of the price with respect to model inputs.
///
/// Every component of a multi-component parameter is reported; for a
/// second-order request on one parameter the symmetric pairs `i ≤ j` are
/// reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sensitivity {
    /// `∂V/∂a`
    First(ParameterName),
    /// `∂²V/∂a∂b`
    Second(ParameterName, ParameterName),
}

impl Sensitivity {
    /// True for second-order requests.
    #[inline]
    pub fn is_second_order(&self) -> bool {
        matches!(self, Sensitivity::Second(..))
    }
}

impl FromStr for Sensitivity {
    type Err = String;

    /// Parses `spot` or `spot,volatility`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').map(str::trim).collect();
        match names.as_slice() {
            [a] => Ok(Sensitivity::First(a.parse()?)),
            [a, b] => Ok(Sensitivity::Second(a.parse()?, b.parse()?)),
            _ => Err(format!("Unknown sensitivity: {}", s)),
        }
    }
}

/// One differentiable scalar: a parameter component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Direction {
    pub name: ParameterName,
    pub component: usize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.component)
    }
}
