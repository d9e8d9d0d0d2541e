//! State-dependent temperature.

use burn::module::Ignored;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use serde::Serialize;

use super::activation::Activation;
use super::device::DeviceSpec;
use super::encoder::Encoder;
use super::torso::MlpNetwork;

/// Temperature description: encoder followed by `n_hidden` ReLU layers of
/// width `hidden_dim` and a scalar output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub encoder: Encoder,
    pub hidden_dim: usize,
    pub n_hidden: usize,
    pub device: DeviceSpec,
}

impl Temperature {
    pub fn init<B: Backend>(
        &self,
        observation_size: usize,
        action_size: usize,
        device: &B::Device,
    ) -> TemperatureNetwork<B> {
        let features = self.encoder.output_size(observation_size, action_size);
        let widths = vec![self.hidden_dim; self.n_hidden];
        let output_size = widths.last().copied().unwrap_or(features);
        TemperatureNetwork {
            encoder: Ignored(self.encoder),
            torso: MlpNetwork::new(features, &widths, Activation::Relu, device),
            output: LinearConfig::new(output_size, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct TemperatureNetwork<B: Backend> {
    encoder: Ignored<Encoder>,
    torso: MlpNetwork<B>,
    output: Linear<B>,
}

impl<B: Backend> TemperatureNetwork<B> {
    /// Log temperature `[batch, 1]` per observation.
    pub fn forward(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        let features = self.encoder.encode(observations, None);
        self.output.forward(self.torso.forward(features))
    }

    /// Temperature `[batch, 1]`, always positive.
    pub fn temperature(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(observations).exp()
    }

    pub fn torso(&self) -> &MlpNetwork<B> {
        &self.torso
    }
}
