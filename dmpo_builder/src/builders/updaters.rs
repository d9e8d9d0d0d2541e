//! `build_actor_updater` and `build_critic_updater`.

use super::optimizer::{dual_optimizers, optimizers};
use crate::config::{BuildError, ConfigValue, Node, Slot};
use crate::registry::Registry;
use crate::updaters::{ActorUpdater, CriticUpdater, DiffusionExpectedSarsa, DiffusionMpo};

// ============================================================================
// Actor updater
// ============================================================================

fn diffusion_mpo<V: ConfigValue>(node: &Node<'_, V>) -> Result<ActorUpdater, BuildError> {
    let optimizer = node.child("optimizer")?;
    let recipes = dual_optimizers().build(&optimizer)?;
    let dual = recipes.dual.ok_or_else(|| BuildError::MissingField {
        path: optimizer.path().to_owned(),
        key: "dual_learning_rate".to_owned(),
    })?;

    let actor_gradient_clip = node.f64("actor_gradient_clip")?;
    let dual_gradient_clip = node.f64("dual_gradient_clip")?;

    Ok(ActorUpdater::DiffusionMpo(DiffusionMpo {
        num_samples: node.positive_usize("num_samples")?,
        epsilon: node.f64("epsilon")?,
        epsilon_penalty: node.f64("epsilon_penalty")?,
        epsilon_mean: node.f64("epsilon_mean")?,
        epsilon_std: node.f64("epsilon_std")?,
        initial_log_temperature: node.f64("initial_log_temperature")?,
        initial_log_alpha_mean: node.f64("initial_log_alpha_mean")?,
        initial_log_alpha_std: node.f64("initial_log_alpha_std")?,
        min_log_dual: node.f64("min_log_dual")?,
        per_dim_constraining: node.bool("per_dim_constraining")?,
        action_penalization: node.bool("action_penalization")?,
        temperature_state: node.bool("temperature_state")?,
        actor_gradient_clip,
        dual_gradient_clip,
        actor_optimizer: recipes.primary.with_gradient_clip(actor_gradient_clip),
        dual_optimizer: dual.with_gradient_clip(dual_gradient_clip),
    }))
}

pub fn actor_updaters<V: ConfigValue>() -> Registry<V, ActorUpdater> {
    Registry::new(Slot::ActorUpdater).register(
        "DiffusionMaximumAPosterioriPolicyOptimization",
        diffusion_mpo::<V>,
    )
}

/// Check the discriminators of an actor updater subtree.
pub fn validate_actor_updater<V: ConfigValue>(node: &Node<'_, V>) -> Result<(), BuildError> {
    actor_updaters().check(node)?;
    dual_optimizers().check(&node.child("optimizer")?)
}

/// Build the actor updater with its actor and dual optimizer recipes.
pub fn build_actor_updater<V: ConfigValue>(node: &Node<'_, V>) -> Result<ActorUpdater, BuildError> {
    validate_actor_updater(node)?;
    let updater = actor_updaters().build(node)?;
    let ActorUpdater::DiffusionMpo(mpo) = &updater;
    log::info!(
        "Built actor updater {} from `{}`: learning_rate={}, dual_learning_rate={}",
        updater.name(),
        node.path(),
        mpo.actor_optimizer.learning_rate,
        mpo.dual_optimizer.learning_rate
    );
    Ok(updater)
}

// ============================================================================
// Critic updater
// ============================================================================

fn diffusion_expected_sarsa<V: ConfigValue>(
    node: &Node<'_, V>,
) -> Result<CriticUpdater, BuildError> {
    let recipes = optimizers().build(&node.child("optimizer")?)?;
    let gradient_clip = node.f64("gradient_clip")?;
    Ok(CriticUpdater::DiffusionExpectedSarsa(DiffusionExpectedSarsa {
        num_samples: node.positive_usize("num_samples")?,
        gradient_clip,
        optimizer: recipes.primary.with_gradient_clip(gradient_clip),
    }))
}

pub fn critic_updaters<V: ConfigValue>() -> Registry<V, CriticUpdater> {
    Registry::new(Slot::CriticUpdater)
        .register("DiffusionExpectedSARSA", diffusion_expected_sarsa::<V>)
}

/// Check the discriminators of a critic updater subtree.
pub fn validate_critic_updater<V: ConfigValue>(node: &Node<'_, V>) -> Result<(), BuildError> {
    critic_updaters().check(node)?;
    optimizers().check(&node.child("optimizer")?)
}

/// Build the critic updater with its optimizer recipe.
pub fn build_critic_updater<V: ConfigValue>(
    node: &Node<'_, V>,
) -> Result<CriticUpdater, BuildError> {
    validate_critic_updater(node)?;
    let updater = critic_updaters().build(node)?;
    log::info!("Built critic updater {} from `{}`", updater.name(), node.path());
    Ok(updater)
}
