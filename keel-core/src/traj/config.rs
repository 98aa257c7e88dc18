//! Configuration of [`Traj`](super::Traj).
use serde::{Deserialize, Serialize};

/// Configuration of [`Traj`](super::Traj).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrajConfig {
    /// The maximum number of transitions kept in the pool.
    pub capacity: usize,

    /// Random seed for drawing batches.
    pub seed: u64,
}

impl Default for TrajConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            seed: 42,
        }
    }
}

impl TrajConfig {
    /// Sets the capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
