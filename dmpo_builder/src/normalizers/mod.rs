//! Observation normalizers.
//!
//! [`ObservationNormalizer`] is the configuration-time description stored in
//! the agent graph; [`MeanStd`] holds the running statistics created once the
//! observation size is known.

mod mean_std;

pub use mean_std::{MeanStd, DEFAULT_MIN_STD};

use serde::{Deserialize, Serialize};

/// Normalizer kinds an agent graph may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum ObservationNormalizer {
    MeanStd {
        /// Symmetric clip applied after normalization.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clip: Option<f64>,
    },
}

impl ObservationNormalizer {
    pub fn name(&self) -> &'static str {
        match self {
            ObservationNormalizer::MeanStd { .. } => "MeanStd",
        }
    }

    /// Running statistics for observations of width `observation_size`.
    pub fn initialize(&self, observation_size: usize) -> MeanStd {
        match self {
            ObservationNormalizer::MeanStd { clip } => {
                MeanStd::new(observation_size).with_clip(*clip)
            }
        }
    }
}
