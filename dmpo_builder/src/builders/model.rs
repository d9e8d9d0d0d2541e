//! `build_model`: the agent graph.

use crate::config::{BuildError, ConfigValue, Node, Slot};
use crate::models::{
    Activation, AgentGraph, Critic, CriticHead, DeviceSpec, DiffusionActor, DiffusionPolicyHead,
    Encoder, MlpTorso, Temperature, Torso, DEFAULT_TARGET_COEFF,
};
use crate::normalizers::ObservationNormalizer;
use crate::registry::Registry;

// ============================================================================
// Registries
// ============================================================================

fn identity_encoder<V: ConfigValue>(_: &Node<'_, V>) -> Result<Encoder, BuildError> {
    Ok(Encoder::Identity)
}

fn observation_action_encoder<V: ConfigValue>(_: &Node<'_, V>) -> Result<Encoder, BuildError> {
    Ok(Encoder::ObservationAction)
}

fn identity_torso<V: ConfigValue>(_: &Node<'_, V>) -> Result<Torso, BuildError> {
    Ok(Torso::Identity)
}

fn mlp_torso<V: ConfigValue>(node: &Node<'_, V>) -> Result<Torso, BuildError> {
    let hidden_layers = node.usize_list("hidden_layers")?;
    if hidden_layers.is_empty() {
        return Err(BuildError::InvalidValue {
            path: node.key_path("hidden_layers"),
            reason: "an MLP needs at least one hidden layer".to_owned(),
        });
    }
    if let Some(i) = hidden_layers.iter().position(|&width| width == 0) {
        return Err(BuildError::InvalidValue {
            path: format!("{}[{}]", node.key_path("hidden_layers"), i),
            reason: "layer widths must be greater than zero".to_owned(),
        });
    }
    let activation = Activation::parse(node.str("activation")?, &node.key_path("activation"))?;
    Ok(Torso::Mlp(MlpTorso {
        hidden_layers,
        activation,
    }))
}

fn value_head<V: ConfigValue>(_: &Node<'_, V>) -> Result<CriticHead, BuildError> {
    Ok(CriticHead::Value)
}

fn mean_std<V: ConfigValue>(node: &Node<'_, V>) -> Result<ObservationNormalizer, BuildError> {
    let clip = if node.has("clip") {
        Some(node.f64("clip")?)
    } else {
        None
    };
    Ok(ObservationNormalizer::MeanStd { clip })
}

pub fn actor_encoders<V: ConfigValue>() -> Registry<V, Encoder> {
    Registry::new(Slot::ActorEncoder).register("IdentityEncoder", identity_encoder::<V>)
}

pub fn actor_torsos<V: ConfigValue>() -> Registry<V, Torso> {
    Registry::new(Slot::ActorTorso).register("IdentityTorso", identity_torso::<V>)
}

pub fn critic_encoders<V: ConfigValue>() -> Registry<V, Encoder> {
    Registry::new(Slot::CriticEncoder)
        .register("ObservationActionEncoder", observation_action_encoder::<V>)
}

pub fn critic_torsos<V: ConfigValue>() -> Registry<V, Torso> {
    Registry::new(Slot::CriticTorso).register("MLP", mlp_torso::<V>)
}

pub fn critic_heads<V: ConfigValue>() -> Registry<V, CriticHead> {
    Registry::new(Slot::CriticHead).register("ValueHead", value_head::<V>)
}

pub fn observation_normalizers<V: ConfigValue>() -> Registry<V, ObservationNormalizer> {
    Registry::new(Slot::ObservationNormalizer).register("MeanStd", mean_std::<V>)
}

// ============================================================================
// Validation
// ============================================================================

/// Check every discriminator of a model subtree without constructing.
pub fn validate_model<V: ConfigValue>(node: &Node<'_, V>) -> Result<(), BuildError> {
    let actor = node.child("actor")?;
    actor_encoders().check(&actor.child("encoder")?)?;
    actor_torsos().check(&actor.child("torso")?)?;

    let critic = node.child("critic")?;
    critic_encoders().check(&critic.child("encoder")?)?;
    let torso = critic.child("torso")?;
    critic_torsos().check(&torso)?;
    if torso.has("activation") {
        Activation::parse(torso.str("activation")?, &torso.key_path("activation"))?;
    }
    critic_heads().check(&critic.child("head")?)?;
    Ok(())
}

// ============================================================================
// build_model
// ============================================================================

/// Build the agent graph from a model subtree.
///
/// All discriminators are checked before anything is constructed. A null,
/// absent or unrecognized `observation_normalizer` leaves the slot empty.
pub fn build_model<V: ConfigValue>(node: &Node<'_, V>) -> Result<AgentGraph, BuildError> {
    validate_model(node)?;

    let actor_node = node.child("actor")?;
    let head = build_policy_head(&actor_node.child("head")?)?;
    let actor = DiffusionActor::new(
        actor_encoders().build(&actor_node.child("encoder")?)?,
        actor_torsos().build(&actor_node.child("torso")?)?,
        head,
    );

    let critic_node = node.child("critic")?;
    let critic = Critic {
        encoder: critic_encoders().build(&critic_node.child("encoder")?)?,
        torso: critic_torsos().build(&critic_node.child("torso")?)?,
        head: critic_heads().build(&critic_node.child("head")?)?,
        device: DeviceSpec::new(critic_node.str("device")?),
    };

    let observation_normalizer = build_observation_normalizer(node)?;

    let temperature_node = node.child("temperature")?;
    let temperature = Temperature {
        encoder: Encoder::Identity,
        hidden_dim: temperature_node.positive_usize("hidden_dim")?,
        n_hidden: temperature_node.usize("n_hidden")?,
        device: DeviceSpec::new(temperature_node.str("device")?),
    };

    let graph = AgentGraph {
        actor,
        critic,
        temperature,
        observation_normalizer,
        actor_squash: node.bool("actor_squash")?,
        action_scale: node.f64("action_scale")?,
        target_coeff: node.f64_or("target_coeff", DEFAULT_TARGET_COEFF)?,
    };
    log::info!(
        "Built agent graph from `{}`: critic torso {:?}, normalizer {}, target_coeff {}",
        node.path(),
        graph.critic.torso,
        graph
            .observation_normalizer
            .as_ref()
            .map_or("none", ObservationNormalizer::name),
        graph.target_coeff
    );
    Ok(graph)
}

fn build_policy_head<V: ConfigValue>(node: &Node<'_, V>) -> Result<DiffusionPolicyHead, BuildError> {
    Ok(DiffusionPolicyHead {
        device: DeviceSpec::new(node.str("device")?),
        num_diffusion_steps: node.positive_usize("num_diffusion_steps")?,
        hidden_dim: node.positive_usize("hidden_dim")?,
        n_hidden: node.usize("n_hidden")?,
        n_blocks: node.usize("n_blocks")?,
        sigma_data: node.f64("sigma_data")?,
        sampler_type: node.str("sampler_type")?.to_owned(),
        model_type: node.str("model_type")?.to_owned(),
    })
}

fn build_observation_normalizer<V: ConfigValue>(
    node: &Node<'_, V>,
) -> Result<Option<ObservationNormalizer>, BuildError> {
    let Some(normalizer) = node.get("observation_normalizer") else {
        return Ok(None);
    };
    let registry = observation_normalizers::<V>();
    match normalizer.get("name").and_then(|name| name.value().as_str()) {
        Some(name) if registry.contains(name) => registry.build(&normalizer).map(Some),
        name => {
            log::warn!(
                "Ignoring observation normalizer {:?} at `{}` (known: {}); running without one",
                name,
                normalizer.path(),
                registry.names().join(", ")
            );
            Ok(None)
        }
    }
}
