//! Device placement.
//!
//! Configuration carries devices as literal strings (`"cpu"`, `"cuda:0"`, ...).
//! Building an agent graph never interprets them. Only initialization asks a
//! [`DevicePlacement`] to turn each string into a backend device, and a
//! placement that cannot honor the name fails there.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::config::BuildError;

/// Device name exactly as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSpec(String);

impl DeviceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves configured device names to backend devices of type `D`.
pub trait DevicePlacement<D> {
    /// Device for `spec`. `component` names the requester in errors.
    fn place(&self, spec: &DeviceSpec, component: &'static str) -> Result<D, BuildError>;
}

/// Explicit name → device table.
///
/// ```ignore
/// let placement = DeviceTable::new()
///     .with_device("cpu", WgpuDevice::Cpu)
///     .with_device("cuda", WgpuDevice::DiscreteGpu(0));
/// ```
#[derive(Debug, Clone)]
pub struct DeviceTable<D> {
    devices: HashMap<String, D>,
}

impl<D> Default for DeviceTable<D> {
    fn default() -> Self {
        Self {
            devices: HashMap::new(),
        }
    }
}

impl<D: Clone> DeviceTable<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `name` to `device`.
    pub fn with_device(mut self, name: impl Into<String>, device: D) -> Self {
        self.devices.insert(name.into(), device);
        self
    }
}

impl<D: Clone> DevicePlacement<D> for DeviceTable<D> {
    fn place(&self, spec: &DeviceSpec, component: &'static str) -> Result<D, BuildError> {
        self.devices
            .get(spec.as_str())
            .cloned()
            .ok_or_else(|| BuildError::UnavailableDevice {
                device: spec.to_string(),
                component,
            })
    }
}

/// Placement for the ndarray backend: only `"cpu"` exists.
#[cfg(feature = "ndarray")]
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuPlacement;

#[cfg(feature = "ndarray")]
impl DevicePlacement<burn::backend::ndarray::NdArrayDevice> for CpuPlacement {
    fn place(
        &self,
        spec: &DeviceSpec,
        component: &'static str,
    ) -> Result<burn::backend::ndarray::NdArrayDevice, BuildError> {
        match spec.as_str() {
            "cpu" => Ok(burn::backend::ndarray::NdArrayDevice::Cpu),
            _ => Err(BuildError::UnavailableDevice {
                device: spec.to_string(),
                component,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_honors_names_literally() {
        let table = DeviceTable::new().with_device("cpu", 0u8).with_device("cuda:1", 1u8);
        assert_eq!(table.place(&DeviceSpec::new("cuda:1"), "critic").unwrap(), 1);
        assert!(matches!(
            table.place(&DeviceSpec::new("cuda"), "critic"),
            Err(BuildError::UnavailableDevice { ref device, component: "critic" }) if device == "cuda"
        ));
    }

    #[test]
    fn test_cpu_placement_rejects_accelerators() {
        assert!(CpuPlacement.place(&DeviceSpec::new("cpu"), "actor head").is_ok());
        let err = CpuPlacement
            .place(&DeviceSpec::new("cuda"), "actor head")
            .unwrap_err();
        assert!(err.to_string().contains("cuda"));
        assert!(err.to_string().contains("actor head"));
    }
}
