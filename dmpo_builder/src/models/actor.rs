//! Diffusion policy actor: encoder → torso → diffusion head.
//!
//! The head is an EDM-preconditioned denoiser. Given noisy actions `x` at
//! noise level `σ` it predicts clean actions as
//!
//! ```text
//! D(x; σ) = c_skip(σ) · x + c_out(σ) · F(c_in(σ) · x, c_noise(σ), features)
//! c_skip = σd² / (σ² + σd²)
//! c_out  = σ · σd / √(σ² + σd²)
//! c_in   = 1 / √(σ² + σd²)
//! c_noise = ln(σ) / 4
//! ```
//!
//! where `σd` is `sigma_data`. `F` is a linear input projection, `n_blocks`
//! residual blocks of `n_hidden` layers of width `hidden_dim`, and a linear
//! output projection. Sampling loops live with the training code.

use burn::module::Ignored;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use serde::Serialize;

use super::activation::Activation;
use super::encoder::Encoder;
use super::head::DiffusionPolicyHead;
use super::torso::{MlpNetwork, Torso};

/// Non-linearity inside the denoiser blocks.
const DENOISER_ACTIVATION: Activation = Activation::Mish;

/// Actor description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffusionActor {
    pub encoder: Encoder,
    pub torso: Torso,
    pub head: DiffusionPolicyHead,
}

impl DiffusionActor {
    pub fn new(encoder: Encoder, torso: Torso, head: DiffusionPolicyHead) -> Self {
        Self {
            encoder,
            torso,
            head,
        }
    }

    /// Instantiate the actor network on `device`.
    pub fn init<B: Backend>(
        &self,
        observation_size: usize,
        action_size: usize,
        device: &B::Device,
    ) -> ActorNetwork<B> {
        let features = self.encoder.output_size(observation_size, action_size);
        let torso = self.torso.init(features, device);
        let torso_size = self.torso.output_size(features);

        let head = &self.head;
        // Noisy action plus one noise-level column.
        let input = LinearConfig::new(torso_size + action_size + 1, head.hidden_dim).init(device);
        let widths = vec![head.hidden_dim; head.n_hidden];
        let blocks = (0..head.n_blocks)
            .map(|_| MlpNetwork::new(head.hidden_dim, &widths, DENOISER_ACTIVATION, device))
            .collect();
        let output = LinearConfig::new(head.hidden_dim, action_size).init(device);

        ActorNetwork {
            encoder: Ignored(self.encoder),
            torso,
            input,
            blocks,
            output,
            sigma_data: head.sigma_data,
            num_diffusion_steps: head.num_diffusion_steps,
        }
    }
}

// ============================================================================
// ActorNetwork
// ============================================================================

#[derive(Module, Debug)]
pub struct ActorNetwork<B: Backend> {
    encoder: Ignored<Encoder>,
    torso: MlpNetwork<B>,
    input: Linear<B>,
    blocks: Vec<MlpNetwork<B>>,
    output: Linear<B>,
    sigma_data: f64,
    num_diffusion_steps: usize,
}

impl<B: Backend> ActorNetwork<B> {
    /// Observation features after encoder and torso.
    pub fn features(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        self.torso.forward(self.encoder.encode(observations, None))
    }

    /// Denoise `noisy_actions` `[batch, action]` at noise levels `sigma` `[batch, 1]`.
    pub fn denoise(
        &self,
        observations: Tensor<B, 2>,
        noisy_actions: Tensor<B, 2>,
        sigma: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let sigma_data = self.sigma_data;
        let sd2 = sigma_data * sigma_data;
        let variance = sigma.clone().powf_scalar(2.0).add_scalar(sd2);

        let c_skip = variance.clone().recip().mul_scalar(sd2);
        let c_out = sigma.clone().mul_scalar(sigma_data) / variance.clone().sqrt();
        let c_in = variance.sqrt().recip();
        let c_noise = sigma.log().div_scalar(4.0);

        let features = self.features(observations);
        let scaled = noisy_actions.clone() * c_in;
        let mut h = self
            .input
            .forward(Tensor::cat(vec![features, scaled, c_noise], 1));
        for block in &self.blocks {
            h = h.clone() + block.forward(h);
        }
        let prediction = self.output.forward(DENOISER_ACTIVATION.apply(h));

        noisy_actions * c_skip + prediction * c_out
    }

    pub fn torso(&self) -> &MlpNetwork<B> {
        &self.torso
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Width of the denoiser hidden layers.
    pub fn hidden_dim(&self) -> usize {
        self.input.weight.dims()[1]
    }

    pub fn action_size(&self) -> usize {
        self.output.weight.dims()[1]
    }

    pub fn sigma_data(&self) -> f64 {
        self.sigma_data
    }

    pub fn num_diffusion_steps(&self) -> usize {
        self.num_diffusion_steps
    }
}
