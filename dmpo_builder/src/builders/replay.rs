//! `build_replay_updater`: the replay buffer.

use crate::config::{BuildError, ConfigValue, Node, Slot};
use crate::registry::Registry;
use crate::replays::{Buffer, BufferConfig, DEFAULT_BATCH_ITERATIONS};

fn buffer<V: ConfigValue>(node: &Node<'_, V>) -> Result<Buffer, BuildError> {
    let discount_factor = node.f64("discount_factor")?;
    if !(0.0..=1.0).contains(&discount_factor) {
        return Err(BuildError::InvalidValue {
            path: node.key_path("discount_factor"),
            reason: format!("{} is outside [0, 1]", discount_factor),
        });
    }
    let batch_iterations = if node.has("batch_iterations") {
        node.positive_usize("batch_iterations")?
    } else {
        DEFAULT_BATCH_ITERATIONS
    };
    let seed = if node.has("seed") {
        Some(node.usize("seed")? as u64)
    } else {
        None
    };

    Ok(Buffer::new(BufferConfig {
        size: node.positive_usize("size")?,
        batch_size: node.positive_usize("batch_size")?,
        discount_factor,
        steps_before_batches: node.usize("steps_before_batches")?,
        return_steps: node.positive_usize("return_steps")?,
        steps_between_batches: node.positive_usize("steps_between_batches")?,
        batch_iterations,
        seed,
    }))
}

pub fn replays<V: ConfigValue>() -> Registry<V, Buffer> {
    Registry::new(Slot::Replay).register("Buffer", buffer::<V>)
}

/// Check the discriminator of a replay subtree.
pub fn validate_replay<V: ConfigValue>(node: &Node<'_, V>) -> Result<(), BuildError> {
    replays().check(node)
}

/// Build an empty replay buffer configured with exactly the given values.
pub fn build_replay_updater<V: ConfigValue>(node: &Node<'_, V>) -> Result<Buffer, BuildError> {
    let buffer = replays().build(node)?;
    let config = buffer.config();
    log::info!(
        "Built replay buffer from `{}`: size={}, batch_size={}, return_steps={}",
        node.path(),
        config.size,
        config.batch_size,
        config.return_steps
    );
    Ok(buffer)
}
