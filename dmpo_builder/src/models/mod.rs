//! Actor, critic and temperature descriptions and their burn networks.
//!
//! Every component exists twice: a plain, serializable description built from
//! configuration (`DiffusionActor`, `Critic`, ...) and the network it
//! initializes into (`ActorNetwork`, `CriticNetwork`, ...).

pub mod activation;
pub mod actor;
pub mod agent;
pub mod critic;
pub mod device;
pub mod encoder;
pub mod head;
pub mod target;
pub mod temperature;
pub mod torso;

pub use activation::Activation;
pub use actor::{ActorNetwork, DiffusionActor};
pub use agent::{AgentGraph, AgentNetworks, DEFAULT_TARGET_COEFF};
pub use critic::{Critic, CriticNetwork};
#[cfg(feature = "ndarray")]
pub use device::CpuPlacement;
pub use device::{DevicePlacement, DeviceSpec, DeviceTable};
pub use encoder::Encoder;
pub use head::{CriticHead, DiffusionPolicyHead};
pub use target::{hard_copy, soft_update};
pub use temperature::{Temperature, TemperatureNetwork};
pub use torso::{MlpNetwork, MlpTorso, Torso};

#[cfg(test)]
mod tests;
