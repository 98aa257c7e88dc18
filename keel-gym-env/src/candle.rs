//! Conversions between [`GymObs`]/[`GymAct`] and candle types.
use crate::{GymAct, GymObs};
use anyhow::Result;
use candle_core::{Device, Tensor};
use keel_candle_agent::TensorBatch;

impl GymObs {
    /// Returns the observation as a tensor of shape `[1, dim]`.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.0, (1, self.0.len()), device)?)
    }
}

impl GymAct {
    /// Constructs an action from a tensor with a single row.
    pub fn from_tensor(t: &Tensor) -> Result<Self> {
        let v = t.flatten_all()?.to_device(&Device::Cpu)?.to_vec1::<f32>()?;
        Ok(Self(v))
    }
}

impl From<GymObs> for TensorBatch {
    fn from(obs: GymObs) -> Self {
        TensorBatch::from_row(obs.0)
    }
}

impl From<GymAct> for TensorBatch {
    fn from(act: GymAct) -> Self {
        TensorBatch::from_row(act.0)
    }
}

impl From<TensorBatch> for GymAct {
    fn from(batch: TensorBatch) -> Self {
        GymAct(batch.into_vec())
    }
}
