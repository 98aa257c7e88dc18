//! Pool of transitions built from sampled episodes.
//!
//! Episodes returned by [`EpiSampler`](crate::sampler::EpiSampler) are turned into
//! transitions `(o_t, a_t, o_t+1, r_t)` and stored in a [`Traj`]. A training run
//! keeps one long-lived off-policy [`Traj`]; each iteration builds an on-policy
//! [`Traj`] from the fresh episodes and merges it with [`Traj::add_traj`].
mod base;
mod batch;
mod config;
pub use base::Traj;
pub use batch::{BatchBase, GenericTransitionBatch};
pub use config::TrajConfig;
