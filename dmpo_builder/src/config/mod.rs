//! Configuration trees, the error taxonomy and layered loading.

mod error;
pub mod loader;
mod node;

pub use error::{BuildError, Slot};
pub use node::{ConfigValue, Node};
