//! Errors raised while turning configuration into components.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A place in the agent assembly where a discriminator selects a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    ActorEncoder,
    ActorTorso,
    CriticEncoder,
    CriticTorso,
    CriticHead,
    Activation,
    ObservationNormalizer,
    Optimizer,
    ActorUpdater,
    CriticUpdater,
    Replay,
}

impl Slot {
    /// Human readable slot name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::ActorEncoder => "actor encoder",
            Slot::ActorTorso => "actor torso",
            Slot::CriticEncoder => "critic encoder",
            Slot::CriticTorso => "critic torso",
            Slot::CriticHead => "critic head",
            Slot::Activation => "activation",
            Slot::ObservationNormalizer => "observation normalizer",
            Slot::Optimizer => "optimizer",
            Slot::ActorUpdater => "actor updater",
            Slot::CriticUpdater => "critic updater",
            Slot::Replay => "replay buffer",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for every builder and for configuration loading.
///
/// Configuration errors are fatal at startup: nothing is retried and no
/// partially built component is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A discriminator names a variant that is not registered for its slot.
    #[error("unsupported {slot} `{name}` at `{path}` (known: {})", .known.join(", "))]
    UnsupportedKind {
        slot: Slot,
        name: String,
        path: String,
        known: Vec<&'static str>,
    },

    /// A required key is absent or null.
    #[error("missing required field `{key}` in `{path}`")]
    MissingField { path: String, key: String },

    /// A value has the wrong shape for the field reading it.
    #[error("expected {expected} at `{path}`, found {found}")]
    InvalidType {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// A value has the right shape but an unusable value.
    #[error("invalid value at `{path}`: {reason}")]
    InvalidValue { path: String, reason: String },

    /// A component asked for a device the placement cannot provide.
    #[error("device `{device}` requested by the {component} is not available")]
    UnavailableDevice {
        device: String,
        component: &'static str,
    },

    /// A configuration file could not be read.
    #[error("cannot read configuration file {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid YAML.
    #[error("cannot parse configuration {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A command line override is not of the form `dotted.key=value`.
    #[error("invalid override `{spec}`: {reason}")]
    InvalidOverride { spec: String, reason: &'static str },
}

impl BuildError {
    /// The slot of an unsupported discriminator, if this is one.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            BuildError::UnsupportedKind { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// Whether this error comes from configuration content rather than I/O.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            BuildError::UnsupportedKind { .. }
                | BuildError::MissingField { .. }
                | BuildError::InvalidType { .. }
                | BuildError::InvalidValue { .. }
        )
    }
}
