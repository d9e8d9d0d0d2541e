//! Torsos: the feature-processing stage between encoder and head.

use burn::module::Ignored;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use serde::Serialize;

use super::activation::Activation;

/// Torso description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum Torso {
    /// Features pass through unchanged.
    #[serde(rename = "IdentityTorso")]
    Identity,
    /// Stack of linear layers, each followed by `activation`.
    #[serde(rename = "MLP")]
    Mlp(MlpTorso),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlpTorso {
    /// Hidden layer widths in order.
    pub hidden_layers: Vec<usize>,
    pub activation: Activation,
}

impl Torso {
    pub fn name(&self) -> &'static str {
        match self {
            Torso::Identity => "IdentityTorso",
            Torso::Mlp(_) => "MLP",
        }
    }

    /// Feature width after the torso for an input of width `input_size`.
    pub fn output_size(&self, input_size: usize) -> usize {
        match self {
            Torso::Identity => input_size,
            Torso::Mlp(mlp) => mlp.hidden_layers.last().copied().unwrap_or(input_size),
        }
    }

    /// Instantiate the torso. The identity torso becomes an empty stack.
    pub fn init<B: Backend>(&self, input_size: usize, device: &B::Device) -> MlpNetwork<B> {
        match self {
            Torso::Identity => MlpNetwork::new(input_size, &[], Activation::Relu, device),
            Torso::Mlp(mlp) => {
                MlpNetwork::new(input_size, &mlp.hidden_layers, mlp.activation, device)
            }
        }
    }
}

// ============================================================================
// MlpNetwork
// ============================================================================

/// Linear layers, each followed by the same non-linearity.
#[derive(Module, Debug)]
pub struct MlpNetwork<B: Backend> {
    layers: Vec<Linear<B>>,
    activation: Ignored<Activation>,
}

impl<B: Backend> MlpNetwork<B> {
    pub fn new(
        input_size: usize,
        widths: &[usize],
        activation: Activation,
        device: &B::Device,
    ) -> Self {
        let mut layers = Vec::with_capacity(widths.len());
        let mut fan_in = input_size;
        for &width in widths {
            layers.push(LinearConfig::new(fan_in, width).init(device));
            fan_in = width;
        }
        Self {
            layers,
            activation: Ignored(activation),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = x;
        for layer in &self.layers {
            x = self.activation.apply(layer.forward(x));
        }
        x
    }

    /// Output widths of the layers in order.
    pub fn widths(&self) -> Vec<usize> {
        self.layers
            .iter()
            .map(|layer| layer.weight.dims()[1])
            .collect()
    }

    /// Input width of the first layer, if there is one.
    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(|layer| layer.weight.dims()[0])
    }

    pub fn activation(&self) -> Activation {
        self.activation.0
    }

    pub fn is_identity(&self) -> bool {
        self.layers.is_empty()
    }
}
