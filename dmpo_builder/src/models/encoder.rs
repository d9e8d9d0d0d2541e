//! Encoders: the first stage of actor, critic and temperature networks.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

/// How raw inputs are turned into features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoder {
    /// Observations pass through unchanged.
    #[serde(rename = "IdentityEncoder")]
    Identity,
    /// Observations concatenated with actions (state-action critics).
    #[serde(rename = "ObservationActionEncoder")]
    ObservationAction,
}

impl Encoder {
    pub fn name(&self) -> &'static str {
        match self {
            Encoder::Identity => "IdentityEncoder",
            Encoder::ObservationAction => "ObservationActionEncoder",
        }
    }

    /// Feature width produced for the given observation and action sizes.
    pub fn output_size(&self, observation_size: usize, action_size: usize) -> usize {
        match self {
            Encoder::Identity => observation_size,
            Encoder::ObservationAction => observation_size + action_size,
        }
    }

    /// Whether [`Encoder::encode`] needs actions next to observations.
    pub fn uses_actions(&self) -> bool {
        matches!(self, Encoder::ObservationAction)
    }

    /// Encode a batch. `actions` is ignored by the identity encoder.
    pub fn encode<B: Backend>(
        &self,
        observations: Tensor<B, 2>,
        actions: Option<Tensor<B, 2>>,
    ) -> Tensor<B, 2> {
        match (self, actions) {
            (Encoder::Identity, _) => observations,
            (Encoder::ObservationAction, Some(actions)) => Tensor::cat(vec![observations, actions], 1),
            // `AgentGraph::initialize` only accepts action encoders in the critic.
            (Encoder::ObservationAction, None) => {
                unreachable!("observation-action encoder called without actions")
            }
        }
    }
}
