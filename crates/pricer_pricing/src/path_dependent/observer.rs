//! PathObserver: streaming statistics accumulation for path-dependent payoffs.
//!
//! Statistics are accumulated incrementally as prices are observed:
//!
//! - **Arithmetic average**: running sum / count
//! - **Geometric average**: exp(running log sum / count)
//! - **Maximum / minimum**: running extrema (the selected observation
//!   carries the derivative, so pathwise sensitivities of extrema are exact)
//! - **Terminal**: last observed price

use num_traits::Float;

/// Streaming path observation statistics.
///
/// # Example
///
/// ```
/// use pricer_pricing::path_dependent::PathObserver;
///
/// let mut observer: PathObserver<f64> = PathObserver::new();
/// for s in [100.0, 105.0, 110.0, 95.0] {
///     observer.observe(s);
/// }
///
/// assert_eq!(observer.count(), 4);
/// assert_eq!(observer.maximum(), 110.0);
/// assert_eq!(observer.minimum(), 95.0);
/// assert_eq!(observer.terminal(), 95.0);
/// ```
#[derive(Clone, Debug)]
pub struct PathObserver<T: Float> {
    running_sum: T,
    running_log_sum: T,
    running_max: T,
    running_min: T,
    count: usize,
    terminal: T,
}

impl<T: Float> Default for PathObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> PathObserver<T> {
    /// Creates a new empty path observer.
    #[inline]
    pub fn new() -> Self {
        Self {
            running_sum: T::zero(),
            running_log_sum: T::zero(),
            running_max: T::neg_infinity(),
            running_min: T::infinity(),
            count: 0,
            terminal: T::zero(),
        }
    }

    /// Observer fed with every element of `prices`.
    pub fn from_prices(prices: &[T]) -> Self {
        let mut observer = Self::new();
        for &s in prices {
            observer.observe(s);
        }
        observer
    }

    /// Observes a new price and updates running statistics.
    ///
    /// The price becomes the terminal value. Prices must be positive for the
    /// geometric average to be meaningful.
    #[inline]
    pub fn observe(&mut self, price: T) {
        self.running_sum = self.running_sum + price;
        self.running_log_sum = self.running_log_sum + price.ln();
        if price > self.running_max {
            self.running_max = price;
        }
        if price < self.running_min {
            self.running_min = price;
        }
        self.count += 1;
        self.terminal = price;
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// `Σ S_i / n`, or 0 with no observations.
    #[inline]
    pub fn arithmetic_average(&self) -> T {
        if self.count == 0 {
            T::zero()
        } else {
            self.running_sum / T::from(self.count).unwrap()
        }
    }

    /// `exp(Σ ln S_i / n)`, or 0 with no observations.
    #[inline]
    pub fn geometric_average(&self) -> T {
        if self.count == 0 {
            T::zero()
        } else {
            (self.running_log_sum / T::from(self.count).unwrap()).exp()
        }
    }

    /// Maximum observed price (`-inf` if empty).
    #[inline]
    pub fn maximum(&self) -> T {
        self.running_max
    }

    /// Minimum observed price (`+inf` if empty).
    #[inline]
    pub fn minimum(&self) -> T {
        self.running_min
    }

    /// Last observed price.
    #[inline]
    pub fn terminal(&self) -> T {
        self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::Dual64;

    #[test]
    fn test_empty_observer() {
        let observer: PathObserver<f64> = PathObserver::new();
        assert_eq!(observer.count(), 0);
        assert_eq!(observer.arithmetic_average(), 0.0);
        assert_eq!(observer.geometric_average(), 0.0);
        assert_eq!(observer.maximum(), f64::NEG_INFINITY);
        assert_eq!(observer.minimum(), f64::INFINITY);
    }

    #[test]
    fn test_statistics() {
        let observer = PathObserver::from_prices(&[100.0, 105.0, 110.0, 95.0, 100.0]);
        assert_eq!(observer.count(), 5);
        assert_relative_eq!(observer.arithmetic_average(), 102.0, epsilon = 1e-12);
        assert_eq!(observer.maximum(), 110.0);
        assert_eq!(observer.minimum(), 95.0);
        assert_eq!(observer.terminal(), 100.0);
    }

    #[test]
    fn test_geometric_average() {
        let observer = PathObserver::from_prices(&[2.0, 8.0]);
        assert_relative_eq!(observer.geometric_average(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extrema_carry_selected_derivative() {
        let prices = [
            Dual64::new(100.0, 1.0),
            Dual64::new(120.0, 2.0),
            Dual64::new(90.0, 3.0),
        ];
        let observer = PathObserver::from_prices(&prices);
        assert_eq!(observer.maximum().eps, 2.0);
        assert_eq!(observer.minimum().eps, 3.0);
        assert_relative_eq!(observer.arithmetic_average().eps, 2.0, epsilon = 1e-12);
    }
}
