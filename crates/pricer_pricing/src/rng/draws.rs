//! Pre-generated standard normal draws shared between passes.

use super::PricerRng;

/// Standard normal draws indexed by (sample, step, factor).
///
/// The draws are constants: every pricing, bump or dual-number pass over
/// the same `DrawSet` sees identical shocks (common random numbers).
///
/// With antithetic sampling only the even samples own a base draw; sample
/// `2k + 1` is the exact negation of sample `2k`. For an odd sample count
/// the last sample is unpaired.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::rng::{DrawSet, PricerRng};
///
/// let mut rng = PricerRng::from_seed(42);
/// let draws = DrawSet::generate(&mut rng, 4, 3, 1, true);
///
/// let mut a = [0.0];
/// let mut b = [0.0];
/// draws.write(0, 2, &mut a);
/// draws.write(1, 2, &mut b);
/// assert_eq!(a[0], -b[0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSet {
    n_samples: usize,
    n_steps: usize,
    n_factors: usize,
    antithetic: bool,
    base: Vec<f64>,
}

impl DrawSet {
    /// Draws a fresh set from `rng`, in (base sample, step, factor) order.
    pub fn generate(
        rng: &mut PricerRng,
        n_samples: usize,
        n_steps: usize,
        n_factors: usize,
        antithetic: bool,
    ) -> Self {
        let n_base = if antithetic {
            n_samples.div_ceil(2)
        } else {
            n_samples
        };
        let mut base = vec![0.0; n_base * n_steps * n_factors];
        rng.fill_normal(&mut base);
        Self {
            n_samples,
            n_steps,
            n_factors,
            antithetic,
            base,
        }
    }

    /// Number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of time steps.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Independent factors per step.
    #[inline]
    pub fn n_factors(&self) -> usize {
        self.n_factors
    }

    /// Whether samples come in negated pairs.
    #[inline]
    pub fn is_antithetic(&self) -> bool {
        self.antithetic
    }

    /// Writes the factor draws of `sample` at `step` into `out`.
    ///
    /// # Panics
    /// Panics if an index is out of range or `out.len() != n_factors()`.
    #[inline]
    pub fn write(&self, sample: usize, step: usize, out: &mut [f64]) {
        assert!(sample < self.n_samples && step < self.n_steps);
        let (base_sample, negate) = if self.antithetic {
            (sample / 2, sample % 2 == 1)
        } else {
            (sample, false)
        };
        let start = (base_sample * self.n_steps + step) * self.n_factors;
        let src = &self.base[start..start + self.n_factors];
        if negate {
            for (o, z) in out.iter_mut().zip(src) {
                *o = -z;
            }
        } else {
            out.copy_from_slice(src);
        }
    }

    /// Groups of sample indices whose payoffs are averaged before
    /// estimating the standard error (pairs under antithetic sampling).
    ///
    /// Groups are equally sized. With antithetic sampling and an odd sample
    /// count the trailing unpaired sample belongs to no group; it still
    /// enters the price.
    pub fn groups(&self) -> Vec<std::ops::Range<usize>> {
        let width = if self.antithetic { 2 } else { 1 };
        (0..self.n_samples / width)
            .map(|g| g * width..(g + 1) * width)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_draws() {
        let a = DrawSet::generate(&mut PricerRng::from_seed(5), 10, 4, 2, false);
        let b = DrawSet::generate(&mut PricerRng::from_seed(5), 10, 4, 2, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_antithetic_pairs_negate() {
        let d = DrawSet::generate(&mut PricerRng::from_seed(9), 6, 5, 2, true);
        let mut even = [0.0; 2];
        let mut odd = [0.0; 2];
        for pair in 0..3 {
            for step in 0..5 {
                d.write(2 * pair, step, &mut even);
                d.write(2 * pair + 1, step, &mut odd);
                assert_eq!(even[0], -odd[0]);
                assert_eq!(even[1], -odd[1]);
            }
        }
    }

    #[test]
    fn test_odd_antithetic_count() {
        let d = DrawSet::generate(&mut PricerRng::from_seed(1), 5, 2, 1, true);
        let groups = d.groups();
        assert_eq!(groups, vec![0..2, 2..4]);
        let mut out = [0.0];
        d.write(4, 1, &mut out);
        assert!(out[0].is_finite());
    }

    #[test]
    fn test_plain_groups_are_singletons() {
        let d = DrawSet::generate(&mut PricerRng::from_seed(1), 3, 1, 1, false);
        assert_eq!(d.groups(), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_sample_panics() {
        let d = DrawSet::generate(&mut PricerRng::from_seed(1), 2, 2, 1, false);
        let mut out = [0.0];
        d.write(2, 0, &mut out);
    }
}
