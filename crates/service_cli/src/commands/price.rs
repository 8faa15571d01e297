//! Price command implementation
//!
//! Prices the configured payoff under the configured model.

use pricer_pricing::greeks::PricingResult;
use tracing::info;

use crate::config::Settings;
use crate::Result;

/// Run the price command
pub fn run(settings: &Settings) -> Result<PricingResult> {
    let params = settings.model.parameters()?;
    let payoff = settings.payoff.payoff()?;
    let engine = settings.simulation.engine()?;

    info!(
        process = %params.process_type(),
        payoff = payoff.kind.name(),
        n_paths = engine.config().n_paths(),
        "Starting pricing"
    );
    let result = engine.price(&params, &payoff)?;
    info!(
        price = result.price,
        std_error = result.std_error,
        "Pricing complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use pricer_models::analytical::BlackScholes;

    #[test]
    fn test_price_matches_black_scholes() {
        let result = run(&fixtures::settings()).unwrap();
        let reference = BlackScholes::new(100.0, 0.05, 0.2)
            .unwrap()
            .price_call(100.0, 1.0);
        assert!((result.price - reference).abs() < 4.0 * result.std_error);
        assert!(result.sensitivities.is_empty());
    }

    #[test]
    fn test_seeded_price_is_reproducible() {
        let settings = fixtures::settings();
        assert_eq!(run(&settings).unwrap(), run(&settings).unwrap());
    }
}
