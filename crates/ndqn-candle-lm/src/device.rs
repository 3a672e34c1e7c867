use candle_core::{Device, Result};
use std::{fmt, str::FromStr};
use tracing::info;

/// Where the Q-network lives. The choice is made once, when the network is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceKind {
    /// First available accelerator (cuda, then metal), cpu otherwise.
    #[default]
    Auto,
    Cpu,
}

impl DeviceKind {
    pub fn select(self) -> Result<Device> {
        let device = match self {
            Self::Cpu => Device::Cpu,
            Self::Auto => {
                let device = Device::cuda_if_available(0)?;
                if device.is_cpu() {
                    Device::metal_if_available(0)?
                } else {
                    device
                }
            }
        };
        info!(requested = %self, ?device, "selected compute device");
        Ok(device)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            other => Err(format!("unknown device `{other}`, expected `auto` or `cpu`")),
        }
    }
}
