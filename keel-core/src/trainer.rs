//! Train [`Agent`].
mod config;
use crate::{
    error::KeelError,
    record::{misc_stat, Record, RecordStorage, RecordValue, Recorder},
    sampler::EpiSampler,
    traj::{BatchBase, Traj, TrajConfig},
    util::measure,
    Agent, Env, ReplayBufferBase,
};
use anyhow::Result;
use chrono::Local;
use log::info;
use std::path::Path;
pub use config::TrainerConfig;

/// The best mean return before any iteration.
const INIT_MAX_REWARD: f32 = -1e6;

/// Summary of a training run returned by [`Trainer::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainStats {
    /// The number of sampled episodes.
    pub total_epi: usize,

    /// The number of sampled environment steps.
    pub total_step: usize,

    /// The number of iterations.
    pub n_iters: usize,

    /// The best mean episode return of an iteration.
    pub max_reward: f32,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// Given an agent implementing [`Agent`], an [`EpiSampler`], an off-policy [`Traj`]
/// and a [`Recorder`], [`Trainer::train`] repeats the following until
/// `max_episodes` episodes have been sampled:
///
/// 1. Take a snapshot of the current policy with [`Agent::behavior_policy`].
/// 2. Sample whole episodes with the snapshot until `max_steps_per_iter`
///    environment steps are collected.
/// 3. Build an on-policy [`Traj`] from the episodes and merge it into the
///    off-policy one.
/// 4. Do as many optimization steps as environment steps were sampled,
///    each on a batch drawn from the off-policy [`Traj`].
/// 5. Every `record_interval` iterations, write a record with the aggregated losses,
///    the statistics of episode returns, the counters and the timings.
/// 6. Save the parameters with tag `last`. If the mean return of the iteration is the
///    best so far, save them with tag `max` as well.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Behavior|B[EpiSampler]
///     B -->|"Episode&lt;E: Env&gt;"|C[on-policy Traj]
///     C -->|add_traj|D[off-policy Traj]
///     D -->|batch|A
///     A -->|Record|E[Recorder]
/// ```
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn save_params<E, R, A>(agent: &A, model_dir: &Path, tag: &str) -> Result<()>
    where
        E: Env,
        R: ReplayBufferBase,
        A: Agent<E, R>,
    {
        let paths = agent.save_params(model_dir, tag)?;
        info!("Saved {} files with tag {} in {:?}", paths.len(), tag, model_dir);
        Ok(())
    }

    /// Trains the agent.
    pub fn train<E, A, O, B>(
        &mut self,
        agent: &mut A,
        sampler: &mut EpiSampler<E>,
        off_traj: &mut Traj<O, B>,
        recorder: &mut dyn Recorder,
    ) -> Result<TrainStats>
    where
        E: Env + Send,
        E::Obs: Send + Into<O>,
        E::Act: Send + Into<B>,
        O: BatchBase,
        B: BatchBase,
        A: Agent<E, Traj<O, B>>,
    {
        if self.config.max_steps_per_iter == 0 {
            let msg = "max_steps_per_iter must be positive".to_string();
            return Err(KeelError::InvalidConfig(msg).into());
        }
        let record_interval = self.config.record_interval.max(1);
        let model_dir = self.config.model_dir.as_ref().map(Path::new);
        let mut stats = TrainStats {
            total_epi: 0,
            total_step: 0,
            n_iters: 0,
            max_reward: INIT_MAX_REWARD,
        };

        agent.train();
        while stats.total_epi < self.config.max_episodes {
            let pol = agent.behavior_policy()?;
            let (epis, sample_time) = measure("sample", || {
                sampler.sample(&pol, self.config.max_steps_per_iter)
            })?;

            let ((n_epis, n_steps, losses), train_time) = measure("train", || {
                let mut on_traj = Traj::<O, B>::build(&TrajConfig::default().capacity(
                    epis.iter().map(|e| e.len()).sum::<usize>().max(1),
                ));
                on_traj.add_epis(&epis)?;
                let n_epis = on_traj.num_epi();
                let n_steps = on_traj.num_step();
                off_traj.add_traj(on_traj)?;

                let mut storage = RecordStorage::new();
                for _ in 0..n_steps {
                    storage.store(agent.opt_with_record(off_traj)?);
                }
                Ok((n_epis, n_steps, storage.aggregate()?))
            })?;

            stats.total_epi += n_epis;
            stats.total_step += n_steps;
            stats.n_iters += 1;

            let rewards = epis.iter().map(|e| e.ret()).collect::<Vec<_>>();
            let mean_rew = rewards.iter().sum::<f32>() / rewards.len().max(1) as f32;
            info!(
                "Iteration {}: TotalEpisode {}, TotalStep {}, RewardAverage {:.3}",
                stats.n_iters, stats.total_epi, stats.total_step, mean_rew
            );

            if stats.n_iters % record_interval == 0 {
                let mut record = losses.merge(misc_stat("Reward", &rewards));
                record.merge_inplace(Record::from_slice(&[
                    ("EpisodePerIter", RecordValue::Scalar(n_epis as f32)),
                    ("TotalEpisode", RecordValue::Scalar(stats.total_epi as f32)),
                    ("StepPerIter", RecordValue::Scalar(n_steps as f32)),
                    ("TotalStep", RecordValue::Scalar(stats.total_step as f32)),
                    ("SampleTime", RecordValue::Scalar(sample_time.as_secs_f32())),
                    ("TrainTime", RecordValue::Scalar(train_time.as_secs_f32())),
                ]));
                record.insert("datetime", RecordValue::DateTime(Local::now()));
                recorder.write(record)?;
            }

            if let Some(model_dir) = model_dir {
                if mean_rew > stats.max_reward {
                    Self::save_params::<E, Traj<O, B>, A>(agent, model_dir, "max")?;
                }
                Self::save_params::<E, Traj<O, B>, A>(agent, model_dir, "last")?;
            }
            stats.max_reward = stats.max_reward.max(mean_rew);
        }

        Ok(stats)
    }
}
