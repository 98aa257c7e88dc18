//! Soft actor-critic agent implemented with [candle](https://crates.io/crates/candle-core).
pub mod mlp;
pub mod model;
pub mod opt;
pub mod sac;
mod tensor_batch;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
pub use tensor_batch::TensorBatch;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Returns the device for a CUDA ordinal, where a negative value means CPU.
    pub fn from_cuda_index(n: i64) -> Self {
        match usize::try_from(n) {
            Ok(n) => Self::Cuda(n),
            Err(_) => Self::Cpu,
        }
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    /// Fails for [`Device::Cuda`] if candle is built without CUDA support.
    fn try_from(device: Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_from_cuda_index() -> Result<()> {
        assert_eq!(Device::from_cuda_index(-1), Device::Cpu);
        assert_eq!(Device::from_cuda_index(1), Device::Cuda(1));
        assert!(candle_core::Device::try_from(Device::Cpu)?.is_cpu());
        Ok(())
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_cuda_without_feature_is_error() {
        assert!(candle_core::Device::try_from(Device::Cuda(0)).is_err());
    }
}
