//! Named non-linearities for configurable torsos.
//!
//! Configuration files name activations by their usual mixed-case spelling
//! (`ReLU`, `Tanh`, ...). Names are resolved exactly against a fixed table;
//! there is no default activation.

use burn::prelude::*;
use burn::tensor::activation;
use serde::{Deserialize, Serialize};

use crate::config::{BuildError, Slot};

/// Non-linearity applied between hidden layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    #[serde(rename = "ReLU")]
    Relu,
    #[serde(rename = "Tanh")]
    Tanh,
    #[serde(rename = "Sigmoid")]
    Sigmoid,
    #[serde(rename = "GELU")]
    Gelu,
    #[serde(rename = "SiLU")]
    Silu,
    #[serde(rename = "LeakyReLU")]
    LeakyRelu,
    #[serde(rename = "Softplus")]
    Softplus,
    #[serde(rename = "Mish")]
    Mish,
}

/// Negative slope of `LeakyReLU`.
const LEAKY_RELU_SLOPE: f64 = 0.01;

impl Activation {
    /// Every registered activation.
    pub const ALL: [Activation; 8] = [
        Activation::Relu,
        Activation::Tanh,
        Activation::Sigmoid,
        Activation::Gelu,
        Activation::Silu,
        Activation::LeakyRelu,
        Activation::Softplus,
        Activation::Mish,
    ];

    /// Configuration name of this activation.
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Relu => "ReLU",
            Activation::Tanh => "Tanh",
            Activation::Sigmoid => "Sigmoid",
            Activation::Gelu => "GELU",
            Activation::Silu => "SiLU",
            Activation::LeakyRelu => "LeakyReLU",
            Activation::Softplus => "Softplus",
            Activation::Mish => "Mish",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|activation| activation.name() == name)
    }

    /// Lookup that reports unknown names as an unsupported activation at `path`.
    pub fn parse(name: &str, path: &str) -> Result<Self, BuildError> {
        Self::from_name(name).ok_or_else(|| BuildError::UnsupportedKind {
            slot: Slot::Activation,
            name: name.to_owned(),
            path: path.to_owned(),
            known: Self::ALL.iter().map(Activation::name).collect(),
        })
    }

    /// Apply the non-linearity element-wise.
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::Relu => activation::relu(x),
            Activation::Tanh => activation::tanh(x),
            Activation::Sigmoid => activation::sigmoid(x),
            Activation::Gelu => activation::gelu(x),
            Activation::Silu => activation::silu(x),
            Activation::LeakyRelu => activation::leaky_relu(x, LEAKY_RELU_SLOPE),
            Activation::Softplus => activation::softplus(x, 1.0),
            Activation::Mish => activation::mish(x),
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
