//! Deep hedging: policies, risk measures and the training loop.
//!
//! # Architecture
//!
//! ```text
//! HedgeTrainer
//! ├── TrainingConfig   (batch size, steps, optimiser, costs, risk measure)
//! ├── PricerRng        (trainer-owned stream, fresh batch per iteration)
//! └── per iteration
//!     ├── HedgeBatch           simulated scenarios (f64, constant)
//!     ├── HedgingPolicy        features → position, generic over T
//!     ├── RiskMeasure          terminal P&L → loss
//!     └── GradientOptimiser    clipped gradient → parameter update
//! ```
//!
//! Terminal P&L per scenario, with discounted prices `S̃_k = e^{−r t_k} S_k`:
//!
//! ```text
//! P&L = premium + Σ_k δ_k (S̃_{k+1} − S̃_k) − c Σ_k |δ_k − δ_{k−1}| S̃_k − e^{−rT} payoff
//! ```
//!
//! where the premium is the batch mean of the discounted payoff.

mod batch;
mod config;
mod evaluate;
mod objective;
mod policy;
mod trainer;

pub use config::{TrainingConfig, TrainingConfigBuilder};
pub use evaluate::{evaluate_policy, PnlSummary, PolicyEvaluation};
pub use objective::RiskMeasure;
pub use policy::{HedgingPolicy, StateFeatures, N_FEATURES};
pub use trainer::{
    CancellationToken, HedgeTrainer, StopReason, TrainingDiagnostics, TrainingOutcome,
};
