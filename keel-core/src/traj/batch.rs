//! Generic transition batches.
use crate::TransitionBatch;
use anyhow::Result;

/// Storage of observations or actions in a [`Traj`](super::Traj).
///
/// Implementors hold up to `capacity` samples. `push` writes samples from index
/// `ix` on, wrapping around to the head of the storage past `capacity`.
pub trait BatchBase: Sized {
    /// Creates an empty storage for `capacity` samples.
    fn new(capacity: usize) -> Self;

    /// Writes the samples of `data` from index `ix`.
    fn push(&mut self, ix: usize, data: Self) -> Result<()>;

    /// Returns the samples at the given indices.
    fn sample(&self, ixs: &[usize]) -> Result<Self>;

    /// Returns the number of samples held.
    fn len(&self) -> usize;
}

/// A batch of transitions with generic observation and action types.
pub struct GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations.
    pub obs: O,

    /// Actions.
    pub act: A,

    /// Next observations.
    pub next_obs: O,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Terminal flags.
    pub is_terminated: Vec<i8>,

    /// Time-limit flags.
    pub is_truncated: Vec<i8>,
}

impl<O, A> TransitionBatch for GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(self) -> (O, A, O, Vec<f32>, Vec<i8>, Vec<i8>) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_terminated,
            self.is_truncated,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &O {
        &self.obs
    }

    fn act(&self) -> &A {
        &self.act
    }
}
