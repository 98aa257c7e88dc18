//! Environment.
use super::{Act, Obs, Step};
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// Environments are not vectorized: a single environment is stepped by a single
/// worker. Parallel rollouts are done by [`EpiSampler`](crate::sampler::EpiSampler),
/// which owns one environment per worker thread.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performs an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;
}
