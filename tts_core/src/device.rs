use std::{fmt, str::FromStr};

use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use serde::Serialize;
use tracing::{debug, warn};

/// Compute device the model runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    /// Make sessions built after this call run on the device. ONNX sessions
    /// inherit the environment's execution providers; CPU needs none.
    pub fn register_execution_provider(self) -> anyhow::Result<()> {
        if self != Device::Cuda {
            return Ok(());
        }
        ort::init()
            .with_execution_providers([CUDAExecutionProvider::default()
                .build()
                .error_on_failure()])
            .commit()
            .map_err(|e| anyhow::anyhow!("failed to register CUDA execution provider: {e}"))?;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested device, as configured. `Auto` takes CUDA when the ONNX runtime
/// reports it usable, the CPU otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    #[default]
    Auto,
    Cuda,
    Cpu,
}

impl DevicePreference {
    /// A CUDA request on a machine without CUDA degrades to the CPU so the
    /// reported device is the one actually used.
    pub fn resolve(self) -> Device {
        match self {
            DevicePreference::Cpu => Device::Cpu,
            _ => self.resolve_with(cuda_available()),
        }
    }

    fn resolve_with(self, cuda_available: bool) -> Device {
        match (self, cuda_available) {
            (DevicePreference::Cpu, _) => Device::Cpu,
            (_, true) => Device::Cuda,
            (DevicePreference::Cuda, false) => {
                warn!("CUDA requested but not available, falling back to CPU");
                Device::Cpu
            }
            (DevicePreference::Auto, false) => Device::Cpu,
        }
    }
}

fn cuda_available() -> bool {
    match CUDAExecutionProvider::default().is_available() {
        Ok(available) => available,
        Err(e) => {
            debug!("CUDA availability check failed: {e}");
            false
        }
    }
}

impl FromStr for DevicePreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(DevicePreference::Auto),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            "cpu" => Ok(DevicePreference::Cpu),
            other => Err(anyhow::anyhow!(
                "unknown device '{other}' (expected auto, cuda or cpu)"
            )),
        }
    }
}
