//! Running mean/standard deviation observation normalizer.
//!
//! Statistics are accumulated with Welford's online algorithm and frozen
//! between calls to [`MeanStd::record`]. Normalization is
//! `(x - mean) / max(std, min_std)`, optionally clipped symmetrically.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

/// Lower bound on the standard deviation used for normalization.
pub const DEFAULT_MIN_STD: f64 = 1e-2;

/// Per-dimension running mean and standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
    mean: Vec<f64>,
    /// Sum of squared deviations per dimension.
    m2: Vec<f64>,
    count: u64,
    clip: Option<f64>,
    min_std: f64,
}

impl MeanStd {
    /// Fresh statistics for `dim` dimensions: mean 0, std 1.
    pub fn new(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            m2: vec![0.0; dim],
            count: 0,
            clip: None,
            min_std: DEFAULT_MIN_STD,
        }
    }

    /// Clip normalized values to `[-clip, clip]`.
    pub fn with_clip(mut self, clip: Option<f64>) -> Self {
        self.clip = clip;
        self
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn clip(&self) -> Option<f64> {
        self.clip
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Population standard deviation per dimension, 1 until two samples exist.
    pub fn std(&self) -> Vec<f64> {
        if self.count < 2 {
            return vec![1.0; self.dim()];
        }
        self.m2
            .iter()
            .map(|m2| (m2 / self.count as f64).sqrt().max(self.min_std))
            .collect()
    }

    /// Fold a flattened `[n, dim]` batch into the statistics.
    ///
    /// Trailing values that do not fill a whole row are ignored.
    pub fn record(&mut self, batch: &[f32]) {
        let dim = self.dim();
        if dim == 0 {
            return;
        }
        for row in batch.chunks_exact(dim) {
            self.count += 1;
            let n = self.count as f64;
            for (i, &value) in row.iter().enumerate() {
                let x = value as f64;
                let delta = x - self.mean[i];
                self.mean[i] += delta / n;
                self.m2[i] += delta * (x - self.mean[i]);
            }
        }
    }

    /// Normalize one observation.
    pub fn normalize(&self, observation: &[f32]) -> Vec<f32> {
        let std = self.std();
        observation
            .iter()
            .zip(self.mean.iter().zip(std.iter()))
            .map(|(&x, (mean, std))| {
                let z = (x as f64 - mean) / std;
                match self.clip {
                    Some(clip) => z.clamp(-clip, clip) as f32,
                    None => z as f32,
                }
            })
            .collect()
    }

    /// Normalize a `[batch, dim]` tensor on its own device.
    pub fn normalize_tensor<B: Backend>(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = observations.device();
        let dim = self.dim();

        let mean: Vec<f32> = self.mean.iter().map(|&x| x as f32).collect();
        let std: Vec<f32> = self.std().iter().map(|&x| x as f32).collect();
        let mean = Tensor::<B, 1>::from_floats(mean.as_slice(), &device).reshape([1, dim]);
        let std = Tensor::<B, 1>::from_floats(std.as_slice(), &device).reshape([1, dim]);

        let normalized = (observations - mean) / std;
        match self.clip {
            Some(clip) => normalized.clamp(-clip, clip),
            None => normalized,
        }
    }
}
