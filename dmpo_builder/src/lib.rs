//! # DMPO Builder: Configuration-Driven Agent Assembly
//!
//! Turns a hierarchical training configuration into the components of a
//! diffusion MPO agent: the agent graph, the actor and critic updaters with
//! their optimizer recipes, and the replay buffer.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 configuration tree (YAML / JSON)                  │
//! │   model          actor_updater      critic_updater      replay    │
//! └─────┬──────────────────┬─────────────────┬────────────────┬───────┘
//!       ▼                  ▼                 ▼                ▼
//!  build_model   build_actor_updater  build_critic_updater  build_replay_updater
//!       │                  │                 │                │
//!       ▼                  ▼                 ▼                ▼
//!  AgentGraph        ActorUpdater       CriticUpdater       Buffer
//!       │ initialize       │ bind             │ bind
//!       ▼                  ▼                  ▼
//!  AgentNetworks<B>   Adam (actor, duals)  Adam (critic)
//! ```
//!
//! Each builder looks up the `name` discriminator of every slot in a
//! [`registry::Registry`] before constructing anything, so an unsupported
//! variant fails fast with [`BuildError::UnsupportedKind`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dmpo_builder::{assemble, config::loader, CpuPlacement};
//! use burn::backend::{Autodiff, NdArray};
//!
//! let mut tree = loader::compose(&["configs/dmpo.yaml"])?;
//! loader::apply_overrides(&mut tree, &["replay.batch_size=512"])?;
//!
//! let assembly = assemble(&tree)?;
//! let agent = assembly
//!     .model
//!     .initialize::<Autodiff<NdArray>, _>(17, 6, &CpuPlacement)?;
//! ```

pub mod builders;
pub mod config;
pub mod models;
pub mod normalizers;
pub mod optim;
pub mod registry;
pub mod replays;
pub mod updaters;

// Builders
pub use builders::{
    assemble, build_actor_updater, build_critic_updater, build_model, build_replay_updater,
    validate_tree, AgentAssembly,
};

// Configuration
pub use config::{BuildError, ConfigValue, Node, Slot};

// Components
pub use models::{AgentGraph, AgentNetworks, DevicePlacement, DeviceSpec, DeviceTable};
#[cfg(feature = "ndarray")]
pub use models::CpuPlacement;
pub use normalizers::{MeanStd, ObservationNormalizer};
pub use optim::{BoundOptimizer, OptimizerRecipe};
pub use replays::{Batch, Buffer, BufferConfig, ReplayError, Transitions};
pub use updaters::{ActorUpdater, CriticUpdater, DiffusionExpectedSarsa, DiffusionMpo};
