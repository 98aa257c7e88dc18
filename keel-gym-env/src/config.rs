//! Configuration of [`GymEnv`](super::GymEnv).
use serde::{Deserialize, Serialize};

/// Configuration of [`GymEnv`](super::GymEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GymEnvConfig {
    /// The name of the environment, e.g., `Pendulum-v0`.
    pub name: String,

    /// Overrides the episode length of the environment.
    pub max_steps: Option<usize>,

    /// Directory where episodes are written as CSV files.
    pub record_dir: Option<String>,
}

impl Default for GymEnvConfig {
    fn default() -> Self {
        Self {
            name: "Pendulum-v0".to_string(),
            max_steps: None,
            record_dir: None,
        }
    }
}

impl GymEnvConfig {
    /// Sets the name of the environment.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the directory for recording episodes.
    pub fn record_dir(mut self, v: Option<String>) -> Self {
        self.record_dir = v;
        self
    }
}
