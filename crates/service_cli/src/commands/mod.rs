//! CLI command implementations
//!
//! Each submodule implements one subcommand and returns a serialisable
//! report; `main` prints it as JSON.

pub mod check;
pub mod greeks;
pub mod price;
pub mod train;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::config::Settings;

    pub(crate) const GBM_CALL: &str = r#"
[model]
process_type = "gbm"
spot = 100.0
volatility = 0.2
rate = 0.05

[payoff]
payoff_type = "european"
option_type = "call"
strike = 100.0
maturity = 1.0

[simulation]
n_paths = 20000
n_steps = 1
seed = 11
use_antithetic = true

[training]
n_paths = 1000
n_steps = 12
seed = 5
learning_rate = 0.05
max_iterations = 150
evaluation_paths = 4000
"#;

    pub(crate) fn settings() -> Settings {
        Settings::from_toml(GBM_CALL).unwrap()
    }
}
