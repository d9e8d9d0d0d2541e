//! Target network updates.
//!
//! Target copies of the actor and critic track their online networks by
//! Polyak averaging:
//!
//! ```text
//! θ_target = τ · θ_online + (1 - τ) · θ_target
//! ```
//!
//! where `τ` is the agent's `target_coeff`. Parameters are matched by module
//! traversal order, so online and target must share an architecture.

use burn::module::{Module, ModuleMapper, Param};
use burn::prelude::*;

/// Collects every float parameter of a module, flattened to 1D.
struct ParamExtractor<B: Backend> {
    params: Vec<Tensor<B, 1>>,
}

impl<B: Backend> ModuleMapper<B> for ParamExtractor<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let value = param.val();
        let numel: usize = value.dims().iter().product();
        self.params.push(value.reshape([numel]));
        param
    }
}

/// Interpolates each visited parameter towards the matching online one.
struct PolyakMapper<B: Backend> {
    online: Vec<Tensor<B, 1>>,
    tau: f64,
    index: usize,
}

impl<B: Backend> ModuleMapper<B> for PolyakMapper<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let index = self.index;
        self.index += 1;

        let Some(online) = self.online.get(index) else {
            return param;
        };
        let target = param.val();
        let shape = target.dims();
        let numel: usize = shape.iter().product();

        let mixed = online.clone().mul_scalar(self.tau)
            + target.reshape([numel]).mul_scalar(1.0 - self.tau);
        Param::initialized(param.id.clone(), mixed.reshape(shape))
    }
}

/// Move `target` towards `online` by `tau`.
///
/// `tau = 0` returns `target` untouched and `tau = 1` returns a copy of
/// `online`.
pub fn soft_update<B, M>(online: &M, target: M, tau: f64) -> M
where
    B: Backend,
    M: Module<B>,
{
    if tau <= 0.0 {
        return target;
    }
    if tau >= 1.0 {
        return hard_copy(online);
    }

    let mut extractor = ParamExtractor { params: Vec::new() };
    let _ = online.clone().map(&mut extractor);

    let mut mapper = PolyakMapper {
        online: extractor.params,
        tau,
        index: 0,
    };
    target.map(&mut mapper)
}

/// Exact copy of `online`, used to create targets.
pub fn hard_copy<B, M>(online: &M) -> M
where
    B: Backend,
    M: Module<B>,
{
    online.clone()
}
