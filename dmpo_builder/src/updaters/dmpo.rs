//! Diffusion maximum a posteriori policy optimization (actor updater).

use burn::module::AutodiffModule;
use burn::optim::Optimizer;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use serde::Serialize;

use super::dual::DualVariables;
use crate::optim::{BoundOptimizer, OptimizerRecipe};

/// Hyperparameters of the diffusion MPO actor update.
///
/// The flags are carried as configured; only `per_dim_constraining` changes
/// anything here (the shape of the mean/std duals).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffusionMpo {
    // ========================================================================
    // Sampling and KL constraints
    // ========================================================================
    /// Actions sampled per state for the non-parametric policy.
    pub num_samples: usize,

    /// KL bound of the non-parametric improvement step.
    pub epsilon: f64,

    /// KL bound of the action penalization step.
    pub epsilon_penalty: f64,

    /// KL bound on the policy mean.
    pub epsilon_mean: f64,

    /// KL bound on the policy standard deviation.
    pub epsilon_std: f64,

    // ========================================================================
    // Dual variables
    // ========================================================================
    pub initial_log_temperature: f64,
    pub initial_log_alpha_mean: f64,
    pub initial_log_alpha_std: f64,

    /// Lower bound applied to every log dual after each step.
    pub min_log_dual: f64,

    pub per_dim_constraining: bool,
    pub action_penalization: bool,
    pub temperature_state: bool,

    // ========================================================================
    // Optimization
    // ========================================================================
    pub actor_gradient_clip: f64,
    pub dual_gradient_clip: f64,

    /// Recipe for the actor parameters (`learning_rate`, `actor_gradient_clip`).
    pub actor_optimizer: OptimizerRecipe,

    /// Recipe for the dual variables (`dual_learning_rate`, `dual_gradient_clip`).
    pub dual_optimizer: OptimizerRecipe,
}

/// Optimizers of one actor update: actor parameters and duals.
pub struct MpoOptimizers<A, D> {
    pub actor: BoundOptimizer<A>,
    pub dual: BoundOptimizer<D>,
}

impl DiffusionMpo {
    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_per_dim_constraining(mut self, per_dim_constraining: bool) -> Self {
        self.per_dim_constraining = per_dim_constraining;
        self
    }

    /// Number of mean/std multipliers for an action space of `action_size`.
    pub fn constraint_size(&self, action_size: usize) -> usize {
        if self.per_dim_constraining {
            action_size
        } else {
            1
        }
    }

    /// Fresh dual variables at their configured initial values.
    pub fn init_duals<B: Backend>(&self, action_size: usize, device: &B::Device) -> DualVariables<B> {
        DualVariables::new(
            self.initial_log_temperature,
            self.initial_log_alpha_mean,
            self.initial_log_alpha_std,
            self.constraint_size(action_size),
            device,
        )
    }

    /// Bind the two recipes to their own parameter sets.
    pub fn bind_optimizers<B, A, D>(
        &self,
        actor: &A,
        duals: &D,
    ) -> MpoOptimizers<impl Optimizer<A, B>, impl Optimizer<D, B>>
    where
        B: AutodiffBackend,
        A: AutodiffModule<B>,
        D: AutodiffModule<B>,
    {
        MpoOptimizers {
            actor: self.actor_optimizer.bind::<B, A>(actor),
            dual: self.dual_optimizer.bind::<B, D>(duals),
        }
    }
}
