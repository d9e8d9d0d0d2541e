//! The agent graph: actor, critic, temperature and their targets.

use burn::prelude::*;
use serde::Serialize;

use super::actor::{ActorNetwork, DiffusionActor};
use super::critic::{Critic, CriticNetwork};
use super::device::DevicePlacement;
use super::target::{hard_copy, soft_update};
use super::temperature::{Temperature, TemperatureNetwork};
use crate::config::BuildError;
use crate::normalizers::{MeanStd, ObservationNormalizer};

/// Polyak coefficient used when `target_coeff` is not configured.
pub const DEFAULT_TARGET_COEFF: f64 = 0.005;

/// Actor-critic-with-targets description produced by `build_model`.
///
/// This is a pure description. [`AgentGraph::initialize`] turns it into burn
/// modules once observation and action sizes are known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentGraph {
    pub actor: DiffusionActor,
    pub critic: Critic,
    pub temperature: Temperature,
    /// `None` when no normalizer is configured.
    pub observation_normalizer: Option<ObservationNormalizer>,
    pub actor_squash: bool,
    pub action_scale: f64,
    pub target_coeff: f64,
}

impl AgentGraph {
    pub fn with_target_coeff(mut self, target_coeff: f64) -> Self {
        self.target_coeff = target_coeff;
        self
    }

    pub fn with_observation_normalizer(mut self, normalizer: Option<ObservationNormalizer>) -> Self {
        self.observation_normalizer = normalizer;
        self
    }

    /// Instantiate every network on the devices named in the configuration.
    ///
    /// Targets start as exact copies of the online actor and critic.
    pub fn initialize<B, P>(
        &self,
        observation_size: usize,
        action_size: usize,
        placement: &P,
    ) -> Result<AgentNetworks<B>, BuildError>
    where
        B: Backend,
        P: DevicePlacement<B::Device>,
    {
        for (size, name) in [(observation_size, "observation_size"), (action_size, "action_size")] {
            if size == 0 {
                return Err(BuildError::InvalidValue {
                    path: name.to_owned(),
                    reason: "must be greater than zero".to_owned(),
                });
            }
        }

        for (encoder, path) in [
            (self.actor.encoder, "actor.encoder"),
            (self.temperature.encoder, "temperature.encoder"),
        ] {
            if encoder.uses_actions() {
                return Err(BuildError::InvalidValue {
                    path: path.to_owned(),
                    reason: format!("{} needs actions and only fits the critic", encoder.name()),
                });
            }
        }

        let actor_device = placement.place(&self.actor.head.device, "actor head")?;
        let critic_device = placement.place(&self.critic.device, "critic")?;
        let temperature_device = placement.place(&self.temperature.device, "temperature")?;

        let actor = self.actor.init::<B>(observation_size, action_size, &actor_device);
        let critic = self.critic.init::<B>(observation_size, action_size, &critic_device);
        let temperature =
            self.temperature
                .init::<B>(observation_size, action_size, &temperature_device);

        log::info!(
            "Initialized agent: observation_size={}, action_size={}, actor on `{}`, critic on `{}`, temperature on `{}`",
            observation_size,
            action_size,
            self.actor.head.device,
            self.critic.device,
            self.temperature.device,
        );

        Ok(AgentNetworks {
            target_actor: hard_copy(&actor),
            target_critic: hard_copy(&critic),
            actor,
            critic,
            temperature,
            observation_normalizer: self
                .observation_normalizer
                .as_ref()
                .map(|normalizer| normalizer.initialize(observation_size)),
            actor_squash: self.actor_squash,
            action_scale: self.action_scale,
            target_coeff: self.target_coeff,
        })
    }
}

// ============================================================================
// AgentNetworks
// ============================================================================

/// Initialized agent: online and target networks plus normalizer statistics.
#[derive(Debug, Clone)]
pub struct AgentNetworks<B: Backend> {
    pub actor: ActorNetwork<B>,
    pub target_actor: ActorNetwork<B>,
    pub critic: CriticNetwork<B>,
    pub target_critic: CriticNetwork<B>,
    pub temperature: TemperatureNetwork<B>,
    pub observation_normalizer: Option<MeanStd>,
    pub actor_squash: bool,
    pub action_scale: f64,
    pub target_coeff: f64,
}

impl<B: Backend> AgentNetworks<B> {
    /// Move both targets towards their online networks by `target_coeff`.
    pub fn update_targets(&mut self) {
        self.target_actor = soft_update(&self.actor, self.target_actor.clone(), self.target_coeff);
        self.target_critic =
            soft_update(&self.critic, self.target_critic.clone(), self.target_coeff);
    }

    /// Apply the normalizer, if any.
    pub fn normalize_observations(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        match &self.observation_normalizer {
            Some(normalizer) => normalizer.normalize_tensor(observations),
            None => observations,
        }
    }

    /// Map raw denoiser outputs to environment actions: optional `tanh`
    /// squashing followed by `action_scale`.
    pub fn postprocess_actions(&self, actions: Tensor<B, 2>) -> Tensor<B, 2> {
        let actions = if self.actor_squash { actions.tanh() } else { actions };
        actions.mul_scalar(self.action_scale)
    }
}
