//! Gym-style environment over the native tasks.
use crate::{
    classic::{make, ClassicControl},
    recorder::EpisodeRecorder,
    BoxSpace, GymAct, GymEnvConfig, GymEnvError, GymObs,
};
use anyhow::Result;
use keel_core::{Env, Step};
use log::{info, trace};
use rand::{rngs::StdRng, SeedableRng};

/// An environment selected by name from the registered tasks.
///
/// Actions given to [`Env::step`] are in `[-1, 1]` and rescaled onto the action
/// space of the task. The step returned holds the given action, not the rescaled one.
///
/// An episode is truncated after `max_steps` steps, which defaults to the episode
/// length of the task.
pub struct GymEnv {
    name: String,
    task: Box<dyn ClassicControl>,
    obs_space: BoxSpace,
    act_space: BoxSpace,
    rng: StdRng,
    max_steps: usize,
    count_steps: usize,
    episode_id: Option<usize>,
    last_obs: Option<Vec<f32>>,
    recorder: Option<EpisodeRecorder>,
}

impl GymEnv {
    /// Returns the name of the environment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the observation space.
    pub fn observation_space(&self) -> &BoxSpace {
        &self.obs_space
    }

    /// Returns the action space.
    pub fn action_space(&self) -> &BoxSpace {
        &self.act_space
    }

    /// Returns the maximum number of steps in an episode.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

impl Env for GymEnv {
    type Config = GymEnvConfig;
    type Obs = GymObs;
    type Act = GymAct;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let task = make(&config.name)?;
        let obs_space = task.observation_space();
        let act_space = task.action_space();
        let max_steps = config.max_steps.unwrap_or(task.max_episode_steps());
        let recorder = match &config.record_dir {
            Some(dir) => Some(EpisodeRecorder::new(
                dir,
                seed,
                obs_space.dim(),
                act_space.dim(),
            )?),
            None => None,
        };
        info!("Build {} with seed {}", config.name, seed);

        Ok(Self {
            name: config.name.clone(),
            task,
            obs_space,
            act_space,
            rng: StdRng::seed_from_u64(seed as u64),
            max_steps,
            count_steps: 0,
            episode_id: None,
            last_obs: None,
            recorder,
        })
    }

    fn reset(&mut self) -> Result<GymObs> {
        let episode_id = self.episode_id.map_or(0, |id| id + 1);
        self.episode_id = Some(episode_id);
        self.count_steps = 0;
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.start(episode_id)?;
        }

        let obs = self.task.reset(&mut self.rng);
        self.last_obs = Some(obs.clone());
        Ok(GymObs(obs))
    }

    fn step(&mut self, a: &GymAct) -> Result<Step<Self>> {
        let expected = self.act_space.dim();
        if a.0.len() != expected {
            let got = a.0.len();
            return Err(GymEnvError::ActDimMismatch { expected, got }.into());
        }
        let last_obs = self
            .last_obs
            .take()
            .ok_or(GymEnvError::StepBeforeReset)?;

        let act = self.act_space.scale(&a.0);
        let (obs, reward, is_terminated) = self.task.step(&act);
        self.count_steps += 1;
        let is_truncated = self.count_steps >= self.max_steps;
        trace!(
            "{} step {}: reward {}, terminated {}, truncated {}",
            self.name,
            self.count_steps,
            reward,
            is_terminated,
            is_truncated
        );

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.write(self.count_steps - 1, &last_obs, &act, reward)?;
            if is_terminated || is_truncated {
                recorder.finish()?;
            }
        }
        self.last_obs = Some(obs.clone());

        Ok(Step::new(
            GymObs(obs),
            a.clone(),
            reward,
            is_terminated,
            is_truncated,
        ))
    }
}
