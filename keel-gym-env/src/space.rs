//! Box-shaped observation and action spaces.
use serde::{Deserialize, Serialize};

/// A box in `R^n` given by elementwise bounds.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BoxSpace {
    /// Lower bounds.
    pub low: Vec<f32>,

    /// Upper bounds.
    pub high: Vec<f32>,

    /// Shape of the elements.
    pub shape: Vec<usize>,
}

impl BoxSpace {
    /// Constructs a one-dimensional box.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Self {
        debug_assert_eq!(low.len(), high.len());
        let shape = vec![low.len()];
        Self { low, high, shape }
    }

    /// Returns the number of elements.
    pub fn dim(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns `true` if `x` lies in the box.
    pub fn contains(&self, x: &[f32]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Maps `x` in `[-1, 1]` linearly onto the box, clipping out-of-range values.
    pub fn scale(&self, x: &[f32]) -> Vec<f32> {
        x.iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(v, (lo, hi))| lo + (v.clamp(-1.0, 1.0) + 1.0) * 0.5 * (hi - lo))
            .collect()
    }
}
