//! Configuration-driven builders.
//!
//! Four entry points, each a pure function of its configuration subtree:
//!
//! - [`build_model`]: agent graph (actor, critic, temperature, normalizer)
//! - [`build_actor_updater`]: diffusion MPO with actor and dual optimizer recipes
//! - [`build_critic_updater`]: expected SARSA with its optimizer recipe
//! - [`build_replay_updater`]: replay buffer
//!
//! Each validates the discriminators of its subtree before constructing
//! anything; [`assemble`] does the same across a whole training tree.

mod assembly;
mod model;
mod optimizer;
mod replay;
mod updaters;

pub use assembly::{
    assemble, validate_tree, AgentAssembly, ACTOR_UPDATER, CRITIC_UPDATER, MODEL, REPLAY,
};
pub use model::{
    actor_encoders, actor_torsos, build_model, critic_encoders, critic_heads, critic_torsos,
    observation_normalizers, validate_model,
};
pub use optimizer::{dual_optimizers, optimizers, OptimizerRecipes};
pub use replay::{build_replay_updater, replays, validate_replay};
pub use updaters::{
    actor_updaters, build_actor_updater, build_critic_updater, critic_updaters,
    validate_actor_updater, validate_critic_updater,
};
