//! Greeks command implementation
//!
//! Prices the configured payoff together with named Greeks and generic
//! parameter sensitivities. Both sets are computed on the same draws.

use pricer_pricing::greeks::{Greek, PricingResult, Sensitivity};
use pricer_pricing::rng::PricerRng;
use tracing::info;

use crate::config::Settings;
use crate::{CliError, Result};

/// Greeks reported when nothing is requested.
pub const DEFAULT_GREEKS: [Greek; 5] = [
    Greek::Delta,
    Greek::Gamma,
    Greek::Vega,
    Greek::Theta,
    Greek::Rho,
];

/// Run the greeks command
///
/// `greeks` are names such as `delta` or `vanna`; `sensitivities` are
/// parameter names (`spot`) or comma-separated pairs (`spot,volatility`).
pub fn run(settings: &Settings, greeks: &[String], sensitivities: &[String]) -> Result<PricingResult> {
    let greeks = parse_all::<Greek>(greeks)?;
    let sensitivities = parse_all::<Sensitivity>(sensitivities)?;
    let greeks = if greeks.is_empty() && sensitivities.is_empty() {
        DEFAULT_GREEKS.to_vec()
    } else {
        greeks
    };

    let params = settings.model.parameters()?;
    let payoff = settings.payoff.payoff()?;
    let engine = settings.simulation.engine()?;
    let seed = engine.rng().seed();

    info!(
        process = %params.process_type(),
        payoff = payoff.kind.name(),
        greek_mode = %engine.config().greek_mode(),
        n_greeks = greeks.len(),
        n_sensitivities = sensitivities.len(),
        "Computing sensitivities"
    );

    let mut result = if greeks.is_empty() {
        None
    } else {
        Some(engine.price_with_greeks_and_rng(
            &params,
            &payoff,
            &greeks,
            &mut PricerRng::from_seed(seed),
        )?)
    };
    if !sensitivities.is_empty() {
        let extra = engine.sensitivities_with_rng(
            &params,
            &payoff,
            &sensitivities,
            &mut PricerRng::from_seed(seed),
        )?;
        result = Some(match result {
            Some(named) => extra
                .sensitivities
                .into_iter()
                .fold(named, |acc, (key, value)| acc.with_sensitivity(key, value)),
            None => extra,
        });
    }
    let result = result.ok_or_else(|| CliError::InvalidArgument("nothing to compute".to_string()))?;

    info!(
        price = result.price,
        n_values = result.sensitivities.len(),
        "Sensitivities complete"
    );
    Ok(result)
}

fn parse_all<T>(names: &[String]) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = String>,
{
    names
        .iter()
        .map(|name| name.parse::<T>().map_err(CliError::InvalidArgument))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use pricer_models::analytical::BlackScholes;

    #[test]
    fn test_default_greeks_reported() {
        let result = run(&fixtures::settings(), &[], &[]).unwrap();
        for greek in DEFAULT_GREEKS {
            assert!(result.get(greek.as_str()).is_some(), "missing {}", greek);
        }
        let delta = BlackScholes::new(100.0, 0.05, 0.2)
            .unwrap()
            .delta(100.0, 1.0, true);
        assert!((result.get("delta").unwrap() - delta).abs() < 0.02);
    }

    #[test]
    fn test_named_and_generic_share_the_price() {
        let settings = fixtures::settings();
        let named = run(&settings, &["delta".to_string()], &[]).unwrap();
        let both = run(
            &settings,
            &["delta".to_string()],
            &["spot".to_string(), "spot,volatility".to_string()],
        )
        .unwrap();
        assert_eq!(named.price, both.price);
        assert_eq!(both.get("delta"), named.get("delta"));
        assert_eq!(both.get("dV/dspot[0]"), named.get("delta"));
        assert!(both.get("d2V/dspot[0]dvolatility[0]").is_some());
    }

    #[test]
    fn test_unknown_names_rejected() {
        let settings = fixtures::settings();
        assert!(matches!(
            run(&settings, &["charm".to_string()], &[]),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            run(&settings, &[], &["beta".to_string()]),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
