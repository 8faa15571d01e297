//! Hedger CLI - pricing, Greeks and hedge training from a TOML file
//!
//! Operational entry point for the hedging engine.
//!
//! # Commands
//!
//! - `hedger price` - Monte Carlo price with standard error
//! - `hedger greeks --greeks delta,gamma --sensitivity spot,volatility` - price with sensitivities
//! - `hedger train --policy mlp` - train a hedging policy and evaluate it out of sample
//! - `hedger check` - validate the configuration
//!
//! Results are printed to stdout as JSON; logs go to stderr and are
//! filtered through `RUST_LOG`.
//!
//! # Architecture
//!
//! As the **S**ervice layer, this crate wires configuration into the
//! pricing (L3) and optimiser (L2.5) layers and owns no numerics itself.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use crate::config::{PolicyKind, Settings};

/// Derivatives pricing, Greeks and deep-hedging CLI
#[derive(Parser)]
#[command(name = "hedger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path [default: hedger.toml, optional]
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print compact rather than pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price the configured payoff
    Price,

    /// Price with Greeks and parameter sensitivities
    Greeks {
        /// Named Greeks (delta, gamma, vega, theta, rho, vanna, volga)
        #[arg(short, long, value_delimiter = ',')]
        greeks: Vec<String>,

        /// Parameter sensitivity, `spot` or `spot,volatility`; repeatable
        #[arg(short, long)]
        sensitivity: Vec<String>,
    },

    /// Train a hedging policy
    Train {
        /// Policy family, overriding the configuration
        #[arg(short, long, value_enum)]
        policy: Option<PolicyKind>,
    },

    /// Check configuration
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialise tracing; RUST_LOG takes precedence over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "Configuration loaded");

    match cli.command {
        Commands::Price => emit(&commands::price::run(&settings)?, cli.compact),
        Commands::Greeks {
            greeks,
            sensitivity,
        } => emit(
            &commands::greeks::run(&settings, &greeks, &sensitivity)?,
            cli.compact,
        ),
        Commands::Train { policy } => emit(&commands::train::run(&settings, policy)?, cli.compact),
        Commands::Check => {
            let report = commands::check::run(&settings)?;
            info!("Configuration OK");
            emit(&report, cli.compact)
        }
    }
}

fn emit<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
