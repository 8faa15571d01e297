//! Seeded pseudo-random number generator for Monte Carlo simulation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Monte Carlo random number generator.
///
/// An explicit handle: every simulation takes `&mut PricerRng`, so two
/// calls share a stream only when the caller hands them the same handle.
/// The seed is stored so that any run (including entropy-seeded ones) can
/// be logged and replayed.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::rng::PricerRng;
///
/// let mut rng1 = PricerRng::from_seed(12345);
/// let mut rng2 = PricerRng::from_seed(12345);
///
/// // Same seed produces identical sequences
/// assert_eq!(rng1.gen_normal(), rng2.gen_normal());
///
/// let mut buffer = vec![0.0; 100];
/// rng1.fill_normal(&mut buffer);
/// ```
#[derive(Clone, Debug)]
pub struct PricerRng {
    inner: StdRng,
    seed: u64,
}

impl PricerRng {
    /// Creates a generator initialised with the given seed.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a generator from an operating-system supplied seed.
    ///
    /// The drawn seed is retained and available through [`PricerRng::seed`].
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    /// Seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Single uniform value in [0, 1).
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Single standard normal variate (Ziggurat via `rand_distr::StandardNormal`).
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills `buffer` with standard normal variates. Empty buffers are a no-op.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }

    /// Next 64-bit value, used to derive seeds for child streams.
    #[inline]
    pub fn next_seed(&mut self) -> u64 {
        self.inner.gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducible_sequences() {
        let mut a = PricerRng::from_seed(7);
        let mut b = PricerRng::from_seed(7);
        let mut xa = vec![0.0; 64];
        let mut xb = vec![0.0; 64];
        a.fill_normal(&mut xa);
        b.fill_normal(&mut xb);
        assert_eq!(xa, xb);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = PricerRng::from_seed(1);
        let mut b = PricerRng::from_seed(2);
        assert_ne!(a.gen_normal(), b.gen_normal());
    }

    #[test]
    fn test_entropy_seed_is_replayable() {
        let mut rng = PricerRng::from_entropy();
        let mut replay = PricerRng::from_seed(rng.seed());
        assert_eq!(rng.gen_uniform(), replay.gen_uniform());
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = PricerRng::from_seed(3);
        for _ in 0..1000 {
            let u = rng.gen_uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = PricerRng::from_seed(11);
        let mut buf = vec![0.0; 50_000];
        rng.fill_normal(&mut buf);
        let n = buf.len() as f64;
        let mean = buf.iter().sum::<f64>() / n;
        let var = buf.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 0.02, "mean = {}", mean);
        assert!((var - 1.0).abs() < 0.03, "var = {}", var);
    }

    #[test]
    fn test_empty_buffer() {
        let mut rng = PricerRng::from_seed(0);
        let mut empty: Vec<f64> = vec![];
        rng.fill_normal(&mut empty);
        assert!(empty.is_empty());
    }
}
