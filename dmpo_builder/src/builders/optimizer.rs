//! Optimizer discrimination shared by both updater builders.

use crate::config::{BuildError, ConfigValue, Node, Slot};
use crate::optim::OptimizerRecipe;
use crate::registry::Registry;

/// Recipes built from one optimizer node.
///
/// `dual` is only read when the caller asks for it; the critic optimizer has
/// no dual learning rate.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerRecipes {
    pub primary: OptimizerRecipe,
    pub dual: Option<OptimizerRecipe>,
}

fn adam<V: ConfigValue>(node: &Node<'_, V>) -> Result<OptimizerRecipes, BuildError> {
    Ok(OptimizerRecipes {
        primary: OptimizerRecipe::adam(node.f64("learning_rate")?),
        dual: None,
    })
}

fn adam_with_dual<V: ConfigValue>(node: &Node<'_, V>) -> Result<OptimizerRecipes, BuildError> {
    Ok(OptimizerRecipes {
        primary: OptimizerRecipe::adam(node.f64("learning_rate")?),
        dual: Some(OptimizerRecipe::adam(node.f64("dual_learning_rate")?)),
    })
}

/// Optimizers accepted by the critic updater.
pub fn optimizers<V: ConfigValue>() -> Registry<V, OptimizerRecipes> {
    Registry::new(Slot::Optimizer).register("Adam", adam::<V>)
}

/// Optimizers accepted by the actor updater: each also needs a dual learning
/// rate.
pub fn dual_optimizers<V: ConfigValue>() -> Registry<V, OptimizerRecipes> {
    Registry::new(Slot::Optimizer).register("Adam", adam_with_dual::<V>)
}
