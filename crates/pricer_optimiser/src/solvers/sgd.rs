//! Stochastic gradient descent with momentum.

use super::GradientOptimiser;

/// SGD with heavy-ball momentum.
///
/// ```text
/// v ← μ v + g
/// p ← p − η v
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sgd {
    learning_rate: f64,
    momentum: f64,
    velocity: Vec<f64>,
}

impl Sgd {
    /// Momentum used by [`OptimizerType::Sgd`](super::OptimizerType::Sgd).
    pub const DEFAULT_MOMENTUM: f64 = 0.9;

    /// Creates an optimiser with zero initial velocity.
    pub fn new(learning_rate: f64, momentum: f64, n_params: usize) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: vec![0.0; n_params],
        }
    }

    /// Momentum coefficient μ.
    pub fn momentum(&self) -> f64 {
        self.momentum
    }
}

impl GradientOptimiser for Sgd {
    fn step(&mut self, params: &mut [f64], grad: &[f64]) {
        assert_eq!(params.len(), self.velocity.len());
        assert_eq!(grad.len(), self.velocity.len());
        for ((p, v), &g) in params.iter_mut().zip(&mut self.velocity).zip(grad) {
            *v = self.momentum * *v + g;
            *p -= self.learning_rate * *v;
        }
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn name(&self) -> &'static str {
        "sgd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_sgd_step() {
        let mut opt = Sgd::new(0.1, 0.0, 2);
        let mut p = vec![1.0, -1.0];
        opt.step(&mut p, &[2.0, -4.0]);
        assert_relative_eq!(p[0], 0.8);
        assert_relative_eq!(p[1], -0.6);
    }

    #[test]
    fn test_momentum_accumulates() {
        let mut opt = Sgd::new(1.0, 0.5, 1);
        let mut p = vec![0.0];
        opt.step(&mut p, &[1.0]);
        opt.step(&mut p, &[1.0]);
        // v1 = 1, v2 = 1.5
        assert_relative_eq!(p[0], -2.5);
    }
}
