//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Training stops once this number of episodes has been sampled.
    pub max_episodes: usize,

    /// The number of environment steps sampled in an iteration.
    pub max_steps_per_iter: usize,

    /// Where to save checkpoints. Nothing is saved if `None`.
    pub model_dir: Option<String>,

    /// Interval of writing records in iterations.
    pub record_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 1_000_000,
            max_steps_per_iter: 10_000,
            model_dir: None,
            record_interval: 1,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of episodes to train on.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the number of environment steps per iteration.
    pub fn max_steps_per_iter(mut self, v: usize) -> Self {
        self.max_steps_per_iter = v;
        self
    }

    /// Sets the directory where checkpoints are saved.
    pub fn model_dir<T: Into<String>>(mut self, model_dir: T) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Sets the interval of writing records in iterations.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
