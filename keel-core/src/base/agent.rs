//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Copy of the current policy handed to the sampler workers.
    ///
    /// The copy does not share parameters with the agent, so it stays fixed while
    /// the agent is optimized.
    type Behavior: Policy<E> + Clone + Send;

    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Returns a snapshot of the current policy for collecting samples.
    fn behavior_policy(&self) -> Result<Self::Behavior>;

    /// Performs an optimization step and returns the losses of the step.
    ///
    /// `buffer` is a replay buffer from which transitions will be taken
    /// for updating model parameters.
    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record>;

    /// Saves the parameters of the agent in `dir`.
    ///
    /// Every file name carries `tag`, so that several snapshots, e.g., `last` and
    /// `max`, can live in the same directory. Returns the paths of the saved files.
    fn save_params(&self, dir: &Path, tag: &str) -> Result<Vec<PathBuf>>;

    /// Loads the parameters saved with [`Agent::save_params`].
    fn load_params(&mut self, dir: &Path, tag: &str) -> Result<()>;
}
