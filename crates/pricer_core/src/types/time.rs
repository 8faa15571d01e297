//! Time grids and day count conventions for simulation and hedging.
//!
//! This module provides:
//! - `TimeGrid`: the validated grid shared by path simulation and hedging
//! - `DayCountConvention`: Year fraction conventions for calendar schedules
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::time::{DayCountConvention, TimeGrid};
//! use chrono::NaiveDate;
//!
//! let valuation = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dates = [
//!     NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
//! ];
//! let grid = TimeGrid::from_dates(valuation, &dates, DayCountConvention::ActualActual365).unwrap();
//! assert_eq!(grid.n_steps(), 2);
//! assert!((grid.maturity() - 182.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, NaiveDate};
use num_traits::Float;
use std::fmt;
use std::str::FromStr;

use super::error::TimeGridError;

/// Ordered simulation grid `0 = t_0 < t_1 < … < t_N = T`.
///
/// Invariants (enforced by every constructor):
/// - at least two points, so `n_steps() >= 1`
/// - first point is exactly 0
/// - strictly increasing and finite
///
/// The grid also exposes each point as a fraction of maturity so that
/// callers differentiating with respect to maturity can rebuild step sizes
/// in their own scalar type via [`TimeGrid::scaled_steps`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// Creates a grid from explicit points.
    ///
    /// # Errors
    /// Returns `TimeGridError` if any invariant is violated.
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::TimeGrid;
    ///
    /// let grid = TimeGrid::new(vec![0.0, 0.25, 1.0]).unwrap();
    /// assert_eq!(grid.n_steps(), 2);
    /// assert!(TimeGrid::new(vec![0.0]).is_err());
    /// assert!(TimeGrid::new(vec![0.1, 1.0]).is_err());
    /// ```
    pub fn new(points: Vec<f64>) -> Result<Self, TimeGridError> {
        if points.len() < 2 {
            return Err(TimeGridError::TooFewPoints(points.len()));
        }
        if points[0] != 0.0 {
            return Err(TimeGridError::NonZeroStart(points[0]));
        }
        for i in 1..points.len() {
            // Written as a negated comparison so that NaN is rejected too.
            if !(points[i] > points[i - 1]) || !points[i].is_finite() {
                return Err(TimeGridError::NotIncreasing { index: i });
            }
        }
        Ok(Self { points })
    }

    /// Creates an equally spaced grid over `[0, maturity]`.
    ///
    /// # Errors
    /// - `InvalidMaturity` if maturity is not positive and finite
    /// - `TooFewPoints` if `n_steps == 0`
    pub fn uniform(maturity: f64, n_steps: usize) -> Result<Self, TimeGridError> {
        if !(maturity > 0.0) || !maturity.is_finite() {
            return Err(TimeGridError::InvalidMaturity(maturity));
        }
        if n_steps == 0 {
            return Err(TimeGridError::TooFewPoints(1));
        }
        let dt = maturity / n_steps as f64;
        let mut points: Vec<f64> = (0..=n_steps).map(|i| i as f64 * dt).collect();
        // Pin the last point so maturity round-trips exactly.
        points[n_steps] = maturity;
        Self::new(points)
    }

    /// Builds a grid from a calendar schedule.
    ///
    /// Each date is converted to a year fraction from `valuation` under
    /// `day_count`; dates must be strictly after the valuation date and in
    /// increasing order.
    pub fn from_dates(
        valuation: NaiveDate,
        dates: &[NaiveDate],
        day_count: DayCountConvention,
    ) -> Result<Self, TimeGridError> {
        let mut points = Vec::with_capacity(dates.len() + 1);
        points.push(0.0);
        for &date in dates {
            if date <= valuation {
                return Err(TimeGridError::DateNotAfterValuation(date));
            }
            points.push(day_count.year_fraction(valuation, date));
        }
        Self::new(points)
    }

    /// Grid points, starting at 0.
    #[inline]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Last grid point.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Number of steps (points minus one).
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.points.len() - 1
    }

    /// Length of step `i`, i.e. `t_{i+1} - t_i`.
    ///
    /// # Panics
    /// Panics if `i >= n_steps()`.
    #[inline]
    pub fn dt(&self, i: usize) -> f64 {
        self.points[i + 1] - self.points[i]
    }

    /// Point `i` as a fraction of maturity.
    #[inline]
    pub fn fraction(&self, i: usize) -> f64 {
        self.points[i] / self.maturity()
    }

    /// Step sizes rebuilt from a (possibly differentiable) maturity.
    ///
    /// `dt_i = maturity · (fraction(i+1) − fraction(i))`, so the result
    /// equals `dt(i)` when `maturity` equals `self.maturity()` and carries
    /// `∂dt_i/∂T` when `maturity` is a dual number.
    pub fn scaled_steps<T: Float>(&self, maturity: T) -> Vec<T> {
        (0..self.n_steps())
            .map(|i| {
                let frac = T::from(self.fraction(i + 1) - self.fraction(i)).unwrap();
                maturity * frac
            })
            .collect()
    }

    /// Grid points rebuilt from a (possibly differentiable) maturity.
    pub fn scaled_points<T: Float>(&self, maturity: T) -> Vec<T> {
        (0..self.points.len())
            .map(|i| maturity * T::from(self.fraction(i)).unwrap())
            .collect()
    }
}

/// Day Count Convention for year fraction calculations.
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::DayCountConvention;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
///
/// let yf = DayCountConvention::ActualActual360.year_fraction(start, end);
/// assert!((yf - 0.5056).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayCountConvention {
    /// Actual/365 Fixed: actual_days / 365.0
    #[default]
    ActualActual365,

    /// Actual/360: actual_days / 360.0
    ActualActual360,

    /// 30/360 US Bond Basis
    Thirty360,
}

impl DayCountConvention {
    /// Returns the standard convention name.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::ActualActual365 => "ACT/365",
            DayCountConvention::ActualActual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Year fraction between two dates, negative if `start > end`.
    pub fn year_fraction(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        match self {
            DayCountConvention::ActualActual365 => (end - start).num_days() as f64 / 365.0,
            DayCountConvention::ActualActual360 => (end - start).num_days() as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let (from, to, sign) = if start <= end {
                    (start, end, 1.0)
                } else {
                    (end, start, -1.0)
                };

                let d1 = if from.day() == 31 { 30 } else { from.day() };
                let d2 = if to.day() == 31 && d1 == 30 {
                    30
                } else {
                    to.day()
                };

                let days = 360 * (to.year() - from.year())
                    + 30 * (to.month() as i32 - from.month() as i32)
                    + (d2 as i32 - d1 as i32);
                sign * days as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = String;

    /// Parses day count convention from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' '], "").as_str() {
            "ACT365" | "ACTUAL365" | "A365" => Ok(DayCountConvention::ActualActual365),
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::ActualActual360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            _ => Err(format!("Unknown day count convention: {}", s)),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::DayCountConvention;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for DayCountConvention {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for DayCountConvention {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            DayCountConvention::from_str(&s).map_err(de::Error::custom)
        }
    }
}
