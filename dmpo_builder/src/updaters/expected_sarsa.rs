//! Diffusion expected SARSA (critic updater).

use burn::module::AutodiffModule;
use burn::optim::Optimizer;
use burn::tensor::backend::AutodiffBackend;
use serde::Serialize;

use crate::optim::{BoundOptimizer, OptimizerRecipe};

/// Hyperparameters of the expected SARSA critic update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffusionExpectedSarsa {
    /// Next actions sampled per state to estimate the expected target value.
    pub num_samples: usize,
    pub gradient_clip: f64,
    /// Critic recipe; carries `gradient_clip` as its clipping norm.
    pub optimizer: OptimizerRecipe,
}

impl DiffusionExpectedSarsa {
    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Bind the critic recipe to the critic parameters.
    pub fn bind_optimizer<B, M>(&self, critic: &M) -> BoundOptimizer<impl Optimizer<M, B>>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
    {
        self.optimizer.bind::<B, M>(critic)
    }
}
