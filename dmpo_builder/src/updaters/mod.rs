//! Actor and critic updater descriptions.
//!
//! Updaters hold the hyperparameters and optimizer recipes of the training
//! step. The loss computations themselves run in the training loop.

mod dmpo;
mod dual;
mod expected_sarsa;

pub use dmpo::{DiffusionMpo, MpoOptimizers};
pub use dual::DualVariables;
pub use expected_sarsa::DiffusionExpectedSarsa;

use serde::Serialize;

/// Actor updater variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum ActorUpdater {
    #[serde(rename = "DiffusionMaximumAPosterioriPolicyOptimization")]
    DiffusionMpo(DiffusionMpo),
}

impl ActorUpdater {
    pub fn name(&self) -> &'static str {
        match self {
            ActorUpdater::DiffusionMpo(_) => "DiffusionMaximumAPosterioriPolicyOptimization",
        }
    }
}

/// Critic updater variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum CriticUpdater {
    #[serde(rename = "DiffusionExpectedSARSA")]
    DiffusionExpectedSarsa(DiffusionExpectedSarsa),
}

impl CriticUpdater {
    pub fn name(&self) -> &'static str {
        match self {
            CriticUpdater::DiffusionExpectedSarsa(_) => "DiffusionExpectedSARSA",
        }
    }
}
