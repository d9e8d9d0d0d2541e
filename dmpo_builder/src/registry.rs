//! Discriminator registries.
//!
//! Each slot of the assembly (actor encoder, critic torso, optimizer, ...)
//! owns a [`Registry`] mapping the accepted `name` values to constructor
//! functions. Looking up an unregistered name is always an explicit
//! [`BuildError::UnsupportedKind`]; nothing falls through silently.
//!
//! ```ignore
//! let torsos = Registry::new(Slot::CriticTorso).register("MLP", build_mlp_torso);
//! torsos.check(&node)?;          // validate only
//! let torso = torsos.build(&node)?; // validate and construct
//! ```

use crate::config::{BuildError, ConfigValue, Node, Slot};

/// Constructor for one registered variant. Receives the node carrying the
/// discriminator.
pub type Constructor<V, T> = fn(&Node<'_, V>) -> Result<T, BuildError>;

/// Closed set of named constructors for one slot.
pub struct Registry<V, T> {
    slot: Slot,
    entries: Vec<(&'static str, Constructor<V, T>)>,
}

impl<V: ConfigValue, T> Registry<V, T> {
    /// Create an empty registry for `slot`.
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            entries: Vec::new(),
        }
    }

    /// Register a variant. Registering an existing name replaces it.
    pub fn register(mut self, name: &'static str, constructor: Constructor<V, T>) -> Self {
        match self.entries.iter_mut().find(|(known, _)| *known == name) {
            Some(entry) => entry.1 = constructor,
            None => self.entries.push((name, constructor)),
        }
        self
    }

    /// Slot this registry serves.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// Whether `name` is registered. Matching is exact and case sensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(known, _)| *known == name)
    }

    /// Constructor registered under `name`; `path` locates the node in errors.
    pub fn resolve(&self, name: &str, path: &str) -> Result<Constructor<V, T>, BuildError> {
        self.entries
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, constructor)| *constructor)
            .ok_or_else(|| BuildError::UnsupportedKind {
                slot: self.slot,
                name: name.to_owned(),
                path: path.to_owned(),
                known: self.names(),
            })
    }

    /// Validate the discriminator of `node` without constructing anything.
    pub fn check(&self, node: &Node<'_, V>) -> Result<(), BuildError> {
        let name = node.discriminator()?;
        self.resolve(name, node.path()).map(|_| ())
    }

    /// Dispatch on the discriminator of `node` and construct the variant.
    pub fn build(&self, node: &Node<'_, V>) -> Result<T, BuildError> {
        let name = node.discriminator()?;
        let constructor = self.resolve(name, node.path())?;
        log::debug!("Building {} `{}` from `{}`", self.slot, name, node.path());
        constructor(node)
    }
}
