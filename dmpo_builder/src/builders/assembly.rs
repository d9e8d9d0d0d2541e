//! Whole-tree assembly.
//!
//! A training configuration has four top-level sections:
//!
//! ```yaml
//! model: { actor: ..., critic: ..., temperature: ..., ... }
//! actor_updater: { name: DiffusionMaximumAPosterioriPolicyOptimization, ... }
//! critic_updater: { name: DiffusionExpectedSARSA, ... }
//! replay: { name: Buffer, ... }
//! ```
//!
//! [`assemble`] checks every discriminator in all four sections before any
//! builder runs, so a typo in `replay.name` fails before the model is built.

use super::model::{build_model, validate_model};
use super::replay::{build_replay_updater, validate_replay};
use super::updaters::{
    build_actor_updater, build_critic_updater, validate_actor_updater, validate_critic_updater,
};
use crate::config::{BuildError, ConfigValue, Node};
use crate::models::AgentGraph;
use crate::replays::Buffer;
use crate::updaters::{ActorUpdater, CriticUpdater};

pub const MODEL: &str = "model";
pub const ACTOR_UPDATER: &str = "actor_updater";
pub const CRITIC_UPDATER: &str = "critic_updater";
pub const REPLAY: &str = "replay";

/// Everything the training loop needs, built from one configuration tree.
#[derive(Debug, Clone)]
pub struct AgentAssembly {
    pub model: AgentGraph,
    pub actor_updater: ActorUpdater,
    pub critic_updater: CriticUpdater,
    pub replay: Buffer,
}

fn section<'a, V: ConfigValue>(root: &'a V, key: &str) -> Result<Node<'a, V>, BuildError> {
    Node::root(root, "").child(key)
}

/// Check all discriminators of a training tree without building anything.
pub fn validate_tree<V: ConfigValue>(root: &V) -> Result<(), BuildError> {
    validate_model(&section(root, MODEL)?)?;
    validate_actor_updater(&section(root, ACTOR_UPDATER)?)?;
    validate_critic_updater(&section(root, CRITIC_UPDATER)?)?;
    validate_replay(&section(root, REPLAY)?)
}

/// Validate the whole tree, then run the four builders.
pub fn assemble<V: ConfigValue>(root: &V) -> Result<AgentAssembly, BuildError> {
    validate_tree(root)?;
    let assembly = AgentAssembly {
        model: build_model(&section(root, MODEL)?)?,
        actor_updater: build_actor_updater(&section(root, ACTOR_UPDATER)?)?,
        critic_updater: build_critic_updater(&section(root, CRITIC_UPDATER)?)?,
        replay: build_replay_updater(&section(root, REPLAY)?)?,
    };
    log::info!("Assembled agent, updaters and replay buffer");
    Ok(assembly)
}
