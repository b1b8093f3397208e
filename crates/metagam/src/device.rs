//! Compute device placement.
//!
//! A [`Device`] names where a model runs and where an extracted artifact is
//! resident. It round-trips through the usual `"cpu"`, `"cuda"` and
//! `"cuda:N"` strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Device placement for models, artifacts and inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Device {
    /// Host memory, CPU kernels.
    #[default]
    Cpu,
    /// CUDA accelerator, optionally pinned to an ordinal.
    Cuda { ordinal: Option<usize> },
}

impl Device {
    /// Default CUDA device (no explicit ordinal).
    pub const fn cuda() -> Self {
        Device::Cuda { ordinal: None }
    }

    /// Returns `true` for accelerator placements.
    #[inline]
    pub fn is_accelerator(self) -> bool {
        matches!(self, Device::Cuda { .. })
    }

    /// Returns `true` for host placement.
    #[inline]
    pub fn is_cpu(self) -> bool {
        matches!(self, Device::Cpu)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda { ordinal: None } => write!(f, "cuda"),
            Device::Cuda { ordinal: Some(i) } => write!(f, "cuda:{}", i),
        }
    }
}

impl FromStr for Device {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigError::UnknownDevice(s.to_string());
        match s.trim() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::cuda()),
            other => {
                let ordinal = other.strip_prefix("cuda:").ok_or_else(unknown)?;
                let ordinal = ordinal.parse::<usize>().map_err(|_| unknown())?;
                Ok(Device::Cuda { ordinal: Some(ordinal) })
            }
        }
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

impl TryFrom<String> for Device {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
