use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the model runs.
///
/// Chosen once when a `Trainer` is built. Only the CPU backend is compiled in:
/// `Auto` resolves to `Cpu` and an explicit `Cuda` request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Cpu,
    Cuda,
    #[default]
    Auto,
}

impl Device {
    /// Whether an accelerator backend exists in this build.
    pub fn accelerator_available() -> bool {
        false
    }

    /// Resolves `Auto` to a concrete device and rejects unavailable ones.
    pub fn resolve(self) -> Result<Device> {
        match self {
            Device::Cpu => Ok(Device::Cpu),
            Device::Auto if Self::accelerator_available() => Ok(Device::Cuda),
            Device::Auto => Ok(Device::Cpu),
            Device::Cuda if Self::accelerator_available() => Ok(Device::Cuda),
            Device::Cuda => Err(Error::DeviceUnavailable(Device::Cuda)),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Device> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda),
            "auto" => Ok(Device::Auto),
            other => Err(Error::InvalidData(format!("unknown device '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_to_cpu() {
        assert_eq!(Device::Auto.resolve().unwrap(), Device::Cpu);
        assert_eq!(Device::Cpu.resolve().unwrap(), Device::Cpu);
    }

    #[test]
    fn cuda_is_unavailable() {
        assert!(matches!(
            Device::Cuda.resolve(),
            Err(Error::DeviceUnavailable(Device::Cuda))
        ));
    }

    #[test]
    fn parses_names() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("gpu".parse::<Device>().unwrap(), Device::Cuda);
        assert!("tpu".parse::<Device>().is_err());
    }
}
