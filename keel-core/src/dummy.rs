//! This module is used for tests.
use crate::{
    record::{Record, RecordValue},
    traj::{BatchBase, Traj},
    Agent, Env, Policy, ReplayBufferBase, Step,
};
use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Dummy observation, the number of steps taken in the episode.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub f32);

impl crate::Obs for DummyObs {
    fn len(&self) -> usize {
        1
    }
}

/// Dummy action.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyAct(pub f32);

impl crate::Act for DummyAct {
    fn len(&self) -> usize {
        1
    }
}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// Episodes are truncated after this number of steps.
    pub episode_len: usize,

    /// If set, the episode terminates at this step instead.
    pub terminate_at: Option<usize>,
}

/// An environment whose observation counts the steps of the episode and
/// whose reward is the action.
pub struct DummyEnv {
    config: DummyEnvConfig,
    t: usize,

    /// Seed given at build time.
    pub seed: i64,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            t: 0,
            seed,
        })
    }

    fn step(&mut self, a: &DummyAct) -> Result<Step<Self>> {
        self.t += 1;
        let is_terminated = self.config.terminate_at == Some(self.t);
        let is_truncated = !is_terminated && self.t >= self.config.episode_len;
        Ok(Step::new(
            DummyObs(self.t as f32),
            a.clone(),
            a.0,
            is_terminated,
            is_truncated,
        ))
    }

    fn reset(&mut self) -> Result<DummyObs> {
        self.t = 0;
        Ok(DummyObs(0.0))
    }
}

/// Column of scalars.
#[derive(Clone, Debug, PartialEq)]
pub struct VecBatch {
    /// Values.
    pub buf: Vec<f32>,
    capacity: usize,
}

impl BatchBase for VecBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![],
            capacity,
        }
    }

    fn push(&mut self, ix: usize, data: Self) -> Result<()> {
        for (i, v) in data.buf.into_iter().enumerate() {
            let ix = (ix + i) % self.capacity;
            if ix < self.buf.len() {
                self.buf[ix] = v;
            } else {
                self.buf.push(v);
            }
        }
        Ok(())
    }

    fn sample(&self, ixs: &[usize]) -> Result<Self> {
        Ok(Self {
            buf: ixs.iter().map(|&ix| self.buf[ix]).collect(),
            capacity: ixs.len(),
        })
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl From<DummyObs> for VecBatch {
    fn from(obs: DummyObs) -> Self {
        Self {
            buf: vec![obs.0],
            capacity: 1,
        }
    }
}

impl From<DummyAct> for VecBatch {
    fn from(act: DummyAct) -> Self {
        Self {
            buf: vec![act.0],
            capacity: 1,
        }
    }
}

/// Pool of dummy transitions.
pub type DummyTraj = Traj<VecBatch, VecBatch>;

/// Policy returning a constant action.
#[derive(Clone)]
pub struct DummyPolicy(pub f32);

impl Policy<DummyEnv> for DummyPolicy {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        Ok(DummyAct(self.0))
    }
}

/// Agent whose action grows with the number of optimization steps.
pub struct DummyAgent {
    /// Number of optimization steps taken.
    pub n_opts: usize,

    /// Training mode.
    pub train: bool,
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        Ok(DummyAct(self.n_opts as f32))
    }
}

impl Agent<DummyEnv, DummyTraj> for DummyAgent {
    type Behavior = DummyPolicy;

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn behavior_policy(&self) -> Result<DummyPolicy> {
        Ok(DummyPolicy(self.n_opts as f32))
    }

    fn opt_with_record(&mut self, buffer: &mut DummyTraj) -> Result<Record> {
        let _ = buffer.batch(2)?;
        self.n_opts += 1;
        Ok(Record::from_slice(&[
            ("PolLoss", RecordValue::Scalar(self.n_opts as f32)),
            ("QfLoss", RecordValue::Scalar(1.0)),
        ]))
    }

    fn save_params(&self, dir: &Path, tag: &str) -> Result<Vec<PathBuf>> {
        let path = dir.join(format!("pol_{}.txt", tag));
        fs::write(&path, format!("{}", self.n_opts))?;
        Ok(vec![path])
    }

    fn load_params(&mut self, dir: &Path, tag: &str) -> Result<()> {
        let path = dir.join(format!("pol_{}.txt", tag));
        self.n_opts = fs::read_to_string(path)?.trim().parse()?;
        Ok(())
    }
}
