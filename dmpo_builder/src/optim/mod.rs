//! Optimizer recipes and their bound optimizers.

mod recipe;

pub use recipe::{BoundOptimizer, OptimizerKind, OptimizerRecipe};
