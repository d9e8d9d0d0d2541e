//! Lagrange multipliers of the MPO policy improvement step.

use burn::module::Param;
use burn::prelude::*;

/// Log-space dual variables.
///
/// The mean and standard deviation multipliers have one entry per action
/// dimension when constraints are applied per dimension, a single entry
/// otherwise.
#[derive(Module, Debug)]
pub struct DualVariables<B: Backend> {
    pub log_temperature: Param<Tensor<B, 1>>,
    pub log_alpha_mean: Param<Tensor<B, 1>>,
    pub log_alpha_std: Param<Tensor<B, 1>>,
}

impl<B: Backend> DualVariables<B> {
    pub fn new(
        initial_log_temperature: f64,
        initial_log_alpha_mean: f64,
        initial_log_alpha_std: f64,
        constraint_size: usize,
        device: &B::Device,
    ) -> Self {
        let full = |size: usize, value: f64| {
            Param::from_tensor(Tensor::<B, 1>::full([size], value, device))
        };
        Self {
            log_temperature: full(1, initial_log_temperature),
            log_alpha_mean: full(constraint_size, initial_log_alpha_mean),
            log_alpha_std: full(constraint_size, initial_log_alpha_std),
        }
    }

    /// Number of mean/std multipliers.
    pub fn constraint_size(&self) -> usize {
        self.log_alpha_mean.val().dims()[0]
    }

    /// Clamp every dual variable from below at `min_log_dual`.
    pub fn project(self, min_log_dual: f64) -> Self {
        let clamp = |param: Param<Tensor<B, 1>>| {
            let id = param.id.clone();
            let value = param.val().clamp_min(min_log_dual).detach();
            Param::initialized(id, value)
        };
        Self {
            log_temperature: clamp(self.log_temperature),
            log_alpha_mean: clamp(self.log_alpha_mean),
            log_alpha_std: clamp(self.log_alpha_std),
        }
    }
}
