//! Output heads of the actor and critic.

use serde::Serialize;

use super::device::DeviceSpec;

/// Diffusion policy head: a noise-conditioned action denoiser.
///
/// `sampler_type` and `model_type` select sampling and network variants in
/// the training loop. They are carried verbatim and never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffusionPolicyHead {
    pub device: DeviceSpec,
    pub num_diffusion_steps: usize,
    pub hidden_dim: usize,
    pub n_hidden: usize,
    pub n_blocks: usize,
    pub sigma_data: f64,
    pub sampler_type: String,
    pub model_type: String,
}

/// Critic output head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name")]
pub enum CriticHead {
    /// Single linear output: one value per sample.
    #[serde(rename = "ValueHead")]
    Value,
}

impl CriticHead {
    pub fn name(&self) -> &'static str {
        match self {
            CriticHead::Value => "ValueHead",
        }
    }

    pub fn output_size(&self) -> usize {
        match self {
            CriticHead::Value => 1,
        }
    }
}
