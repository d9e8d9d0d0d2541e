//! State-action value critic: encoder → torso → value head.

use burn::module::Ignored;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use serde::Serialize;

use super::device::DeviceSpec;
use super::encoder::Encoder;
use super::head::CriticHead;
use super::torso::{MlpNetwork, Torso};

/// Critic description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Critic {
    pub encoder: Encoder,
    pub torso: Torso,
    pub head: CriticHead,
    pub device: DeviceSpec,
}

impl Critic {
    pub fn init<B: Backend>(
        &self,
        observation_size: usize,
        action_size: usize,
        device: &B::Device,
    ) -> CriticNetwork<B> {
        let features = self.encoder.output_size(observation_size, action_size);
        CriticNetwork {
            encoder: Ignored(self.encoder),
            torso: self.torso.init(features, device),
            head: LinearConfig::new(self.torso.output_size(features), self.head.output_size())
                .init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct CriticNetwork<B: Backend> {
    encoder: Ignored<Encoder>,
    torso: MlpNetwork<B>,
    head: Linear<B>,
}

impl<B: Backend> CriticNetwork<B> {
    /// Values `[batch, 1]` of `actions` in `observations`.
    pub fn forward(&self, observations: Tensor<B, 2>, actions: Tensor<B, 2>) -> Tensor<B, 2> {
        let features = self.encoder.encode(observations, Some(actions));
        self.head.forward(self.torso.forward(features))
    }

    pub fn torso(&self) -> &MlpNetwork<B> {
        &self.torso
    }

    /// Width of the encoded features fed to the torso.
    pub fn input_size(&self) -> usize {
        self.torso
            .input_size()
            .unwrap_or_else(|| self.head.weight.dims()[0])
    }
}
