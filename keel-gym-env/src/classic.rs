//! Classic control tasks simulated natively.
mod mountain_car;
mod pendulum;
use crate::{BoxSpace, GymEnvError};
pub use mountain_car::MountainCarContinuous;
pub use pendulum::Pendulum;
use rand::rngs::StdRng;

/// Dynamics of a task without time limit, recording or action scaling.
pub trait ClassicControl: Send {
    /// Returns the observation space.
    fn observation_space(&self) -> BoxSpace;

    /// Returns the action space.
    fn action_space(&self) -> BoxSpace;

    /// Returns the default episode length.
    fn max_episode_steps(&self) -> usize;

    /// Draws an initial state and returns its observation.
    fn reset(&mut self, rng: &mut StdRng) -> Vec<f32>;

    /// Applies an action in the action space.
    ///
    /// Returns the next observation, the reward and whether a terminal state was reached.
    fn step(&mut self, act: &[f32]) -> (Vec<f32>, f32, bool);
}

/// Returns the task registered with `name`.
pub fn make(name: &str) -> Result<Box<dyn ClassicControl>, GymEnvError> {
    match name {
        "Pendulum-v0" | "Pendulum-v1" => Ok(Box::new(Pendulum::default())),
        "MountainCarContinuous-v0" => Ok(Box::new(MountainCarContinuous::default())),
        _ => Err(GymEnvError::UnknownEnv(name.to_string())),
    }
}
