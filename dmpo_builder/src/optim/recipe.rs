//! Two-phase optimizer construction.
//!
//! Configuration only knows hyperparameters; parameters exist once the agent
//! is initialized. An [`OptimizerRecipe`] captures the former and
//! [`OptimizerRecipe::bind`] combines it with the latter:
//!
//! ```ignore
//! let recipe = OptimizerRecipe::adam(3e-4).with_gradient_clip(1.0);
//! let mut optimizer = recipe.bind(&agent.actor);
//! actor = optimizer.step(actor, grads);
//! ```

use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use serde::Serialize;

/// Optimizer algorithms a recipe can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptimizerKind {
    Adam,
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Adam => "Adam",
        }
    }
}

/// Optimizer hyperparameters, captured at configuration time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerRecipe {
    pub kind: OptimizerKind,
    pub learning_rate: f64,
    /// Adam epsilon.
    pub epsilon: f32,
    /// Maximum global gradient norm. `None` disables clipping.
    pub gradient_clip: Option<f32>,
}

impl OptimizerRecipe {
    pub fn adam(learning_rate: f64) -> Self {
        Self {
            kind: OptimizerKind::Adam,
            learning_rate,
            epsilon: 1e-8,
            gradient_clip: None,
        }
    }

    /// Clip gradients to `max_norm`. Non-positive values disable clipping.
    pub fn with_gradient_clip(mut self, max_norm: f64) -> Self {
        self.gradient_clip = (max_norm > 0.0).then_some(max_norm as f32);
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Create a live optimizer for the parameters of `module`.
    pub fn bind<B, M>(&self, module: &M) -> BoundOptimizer<impl Optimizer<M, B>>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
    {
        let optimizer = match self.kind {
            OptimizerKind::Adam => AdamConfig::new()
                .with_epsilon(self.epsilon)
                .with_grad_clipping(self.gradient_clip.map(GradientClippingConfig::Norm))
                .init::<B, M>(),
        };

        let num_params = module.num_params();
        log::debug!(
            "Bound {} optimizer: learning_rate={}, gradient_clip={:?}, parameters={}",
            self.kind.name(),
            self.learning_rate,
            self.gradient_clip,
            num_params
        );

        BoundOptimizer {
            optimizer,
            kind: self.kind,
            learning_rate: self.learning_rate,
            num_params,
        }
    }
}

/// An optimizer bound to one parameter set, with the learning rate it was
/// configured with.
pub struct BoundOptimizer<O> {
    optimizer: O,
    kind: OptimizerKind,
    learning_rate: f64,
    num_params: usize,
}

impl<O> BoundOptimizer<O> {
    pub fn kind(&self) -> OptimizerKind {
        self.kind
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Number of scalar parameters at bind time.
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Apply one update with the configured learning rate.
    pub fn step<B, M>(&mut self, module: M, grads: GradientsParams) -> M
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        self.optimizer.step(self.learning_rate, module, grads)
    }
}

impl<O> std::fmt::Debug for BoundOptimizer<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundOptimizer")
            .field("kind", &self.kind)
            .field("learning_rate", &self.learning_rate)
            .field("num_params", &self.num_params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::nn::{Linear, LinearConfig};
    use burn::prelude::*;

    type TestBackend = Autodiff<NdArray<f32>>;

    fn weights(layer: &Linear<TestBackend>) -> Vec<f32> {
        layer.weight.val().into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_non_positive_clip_disables_clipping() {
        assert_eq!(OptimizerRecipe::adam(1e-3).with_gradient_clip(0.0).gradient_clip, None);
        assert_eq!(OptimizerRecipe::adam(1e-3).with_gradient_clip(-1.0).gradient_clip, None);
        assert_eq!(
            OptimizerRecipe::adam(1e-3).with_gradient_clip(0.5).gradient_clip,
            Some(0.5)
        );
    }

    #[test]
    fn test_bind_counts_parameters() {
        let device = Default::default();
        let layer = LinearConfig::new(3, 2).init::<TestBackend>(&device);
        let optimizer = OptimizerRecipe::adam(3e-4).bind::<TestBackend, _>(&layer);
        assert_eq!(optimizer.num_params(), 3 * 2 + 2);
        assert_eq!(optimizer.kind(), OptimizerKind::Adam);
        assert_eq!(optimizer.learning_rate(), 3e-4);
    }

    #[test]
    fn test_step_moves_parameters() {
        let device = Default::default();
        let layer = LinearConfig::new(3, 1).init::<TestBackend>(&device);
        let before = weights(&layer);
        let mut optimizer = OptimizerRecipe::adam(1e-2)
            .with_gradient_clip(1.0)
            .bind::<TestBackend, _>(&layer);

        let input = Tensor::<TestBackend, 2>::ones([4, 3], &device);
        let loss = layer.forward(input).powf_scalar(2.0).mean();
        let grads = GradientsParams::from_grads(loss.backward(), &layer);
        let layer = optimizer.step::<TestBackend, _>(layer, grads);

        assert_ne!(weights(&layer), before);
    }
}
