use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use keel_core::traj::BatchBase;

/// Rows of `f32` vectors that are handed to the networks as a 2-D [`Tensor`].
///
/// The rows are kept in host memory. [`BatchBase::push`] fills the storage as a
/// ring of `capacity` rows, so it can back a [`Traj`](keel_core::traj::Traj).
#[derive(Clone, Debug, PartialEq)]
pub struct TensorBatch {
    data: Vec<f32>,
    dim: usize,
    capacity: usize,
}

impl TensorBatch {
    /// Creates a batch of a single row.
    pub fn from_row(row: Vec<f32>) -> Self {
        let dim = row.len();
        Self {
            data: row,
            dim,
            capacity: 1,
        }
    }

    /// Creates a batch from a 2-D tensor, one row per sample.
    pub fn from_tensor(t: &Tensor) -> Result<Self> {
        let (n, dim) = t.dims2()?;
        let data = t.flatten_all()?.to_device(&Device::Cpu)?.to_vec1::<f32>()?;
        Ok(Self {
            data,
            dim,
            capacity: n,
        })
    }

    /// Returns the number of elements in a row.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the row at `ix`.
    pub fn row(&self, ix: usize) -> Option<&[f32]> {
        self.data.get(ix * self.dim..(ix + 1) * self.dim)
    }

    /// Returns the elements of all rows.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns the rows as a tensor of shape `[len, dim]`.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.data, (self.len(), self.dim), device)?)
    }
}

impl BatchBase for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![],
            dim: 0,
            capacity,
        }
    }

    /// Writes the rows of `data` from row `index`, wrapping around at the capacity.
    ///
    /// Rows are written in order, so if `data` holds more rows than the capacity
    /// the later rows overwrite the earlier ones.
    fn push(&mut self, index: usize, data: Self) -> Result<()> {
        let n = data.len();
        if n == 0 {
            return Ok(());
        }
        if self.data.is_empty() {
            self.dim = data.dim;
        } else if self.dim != data.dim {
            return Err(anyhow!(
                "Row size mismatch: expected {}, got {}",
                self.dim,
                data.dim
            ));
        }

        for r in 0..n {
            let pos = (index + r) % self.capacity;
            let src = &data.data[r * self.dim..(r + 1) * self.dim];
            let start = pos * self.dim;
            if start < self.data.len() {
                self.data[start..start + self.dim].copy_from_slice(src);
            } else if start == self.data.len() {
                self.data.extend_from_slice(src);
            } else {
                return Err(anyhow!("Row {} is pushed before row {}", pos, self.len()));
            }
        }

        Ok(())
    }

    fn sample(&self, ixs: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(ixs.len() * self.dim);
        for &ix in ixs.iter() {
            let row = self
                .row(ix)
                .ok_or_else(|| anyhow!("Index {} out of {} rows", ix, self.len()))?;
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            dim: self.dim,
            capacity: ixs.len(),
        })
    }

    fn len(&self) -> usize {
        match self.dim {
            0 => 0,
            dim => self.data.len() / dim,
        }
    }
}
