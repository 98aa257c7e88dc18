//! Episodes written as CSV files.
use anyhow::Result;
use csv::Writer;
use keel_core::util::capped_cubic_schedule;
use log::info;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

/// Writes the steps of selected episodes to `episode_<id>_seed<seed>.csv` files.
///
/// Episodes are selected with [`capped_cubic_schedule`] on their ids, which count
/// the resets of the environment from 0.
pub struct EpisodeRecorder {
    dir: PathBuf,
    seed: i64,
    obs_dim: usize,
    act_dim: usize,
    writer: Option<Writer<File>>,
}

impl EpisodeRecorder {
    /// Creates the directory if it does not exist.
    pub fn new(dir: impl AsRef<Path>, seed: i64, obs_dim: usize, act_dim: usize) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            seed,
            obs_dim,
            act_dim,
            writer: None,
        })
    }

    /// Returns the path of the file for an episode.
    pub fn path(&self, episode_id: usize) -> PathBuf {
        self.dir
            .join(format!("episode_{:06}_seed{}.csv", episode_id, self.seed))
    }

    /// Starts an episode, closing the previous one.
    pub fn start(&mut self, episode_id: usize) -> Result<()> {
        self.finish()?;
        if !capped_cubic_schedule(episode_id) {
            return Ok(());
        }

        let path = self.path(episode_id);
        let mut writer = Writer::from_path(&path)?;
        let mut header = vec!["step".to_string()];
        header.extend((0..self.obs_dim).map(|i| format!("obs{}", i)));
        header.extend((0..self.act_dim).map(|i| format!("act{}", i)));
        header.push("reward".to_string());
        writer.write_record(&header)?;
        info!("Record episode {} to {:?}", episode_id, path);
        self.writer = Some(writer);
        Ok(())
    }

    /// Writes a step if the current episode is recorded.
    pub fn write(&mut self, step: usize, obs: &[f32], act: &[f32], reward: f32) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            let mut row = vec![step.to_string()];
            row.extend(obs.iter().chain(act.iter()).map(|v| v.to_string()));
            row.push(reward.to_string());
            writer.write_record(&row)?;
        }
        Ok(())
    }

    /// Flushes and closes the current episode.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
