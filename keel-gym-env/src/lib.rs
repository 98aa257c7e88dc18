//! Classic control environments with a Gym-style interface.
//!
//! [`GymEnv`] implements [`Env`](keel_core::Env) over tasks simulated in Rust,
//! selected by their Gym names:
//!
//! * `Pendulum-v0`, `Pendulum-v1`
//! * `MountainCarContinuous-v0`
//!
//! Observations and actions are [`GymObs`] and [`GymAct`], flat `f32` vectors.
//! Policies act in `[-1, 1]` and [`GymEnv`] rescales the actions onto the
//! [`BoxSpace`] of the task. With the `candle` feature, both convert into
//! [`TensorBatch`](keel_candle_agent::TensorBatch) for the replay pool.
//!
//! ```no_run
//! use keel_core::Env;
//! use keel_gym_env::{GymAct, GymEnv, GymEnvConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GymEnvConfig::default().name("Pendulum-v0");
//! let mut env = GymEnv::build(&config, 42)?;
//! let _obs = env.reset()?;
//! let step = env.step(&GymAct(vec![0.0]))?;
//! assert!(step.reward <= 0.0);
//! # Ok(())
//! # }
//! ```
mod act;
mod base;
#[cfg(feature = "candle")]
mod candle;
pub mod classic;
mod config;
mod error;
mod obs;
mod recorder;
mod space;
pub use act::GymAct;
pub use base::GymEnv;
pub use config::GymEnvConfig;
pub use error::GymEnvError;
pub use obs::GymObs;
pub use recorder::EpisodeRecorder;
pub use space::BoxSpace;
