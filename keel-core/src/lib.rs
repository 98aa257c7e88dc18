#![warn(missing_docs)]
//! Core components of keel.
//!
//! This crate provides the pieces a soft actor-critic training run is wired from:
//!
//! * [`Env`], [`Policy`] and [`Agent`] describe the environment, the behaviour of an
//!   agent and its training interface.
//! * [`Traj`](traj::Traj) is the pool of transitions the agent is trained on.
//! * [`EpiSampler`](sampler::EpiSampler) rolls out whole episodes with a number of
//!   worker threads.
//! * [`Trainer`] runs the sample-then-train loop, writes records through a
//!   [`Recorder`](record::Recorder) and saves checkpoints.
pub mod error;
pub mod record;
pub mod sampler;
pub mod traj;
pub mod util;

#[cfg(test)]
mod dummy;

mod base;
pub use base::{
    Act, Agent, Env, Episode, ExperienceBufferBase, Obs, Policy, ReplayBufferBase, Step,
    TransitionBatch,
};

mod trainer;
pub use trainer::{TrainStats, Trainer, TrainerConfig};
