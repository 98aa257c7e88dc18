//! Episode.
use super::{Env, Step};

/// A complete rollout of a policy in an environment.
///
/// `obs` holds `o_0, ..., o_T`, one element more than the other fields, so that
/// the next observation of step `t` is `obs[t + 1]`.
pub struct Episode<E: Env> {
    /// Observations.
    pub obs: Vec<E::Obs>,

    /// Actions.
    pub act: Vec<E::Act>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Terminal flags.
    pub is_terminated: Vec<i8>,

    /// Time-limit flags.
    pub is_truncated: Vec<i8>,
}

impl<E: Env> std::fmt::Debug for Episode<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Episode")
            .field("obs", &self.obs)
            .field("act", &self.act)
            .field("reward", &self.reward)
            .field("is_terminated", &self.is_terminated)
            .field("is_truncated", &self.is_truncated)
            .finish()
    }
}

impl<E: Env> Episode<E> {
    /// Starts an episode from the initial observation.
    pub fn new(init_obs: E::Obs) -> Self {
        Self {
            obs: vec![init_obs],
            act: vec![],
            reward: vec![],
            is_terminated: vec![],
            is_truncated: vec![],
        }
    }

    /// Appends a step.
    pub fn push(&mut self, step: Step<E>) {
        self.obs.push(step.obs);
        self.act.push(step.act);
        self.reward.push(step.reward);
        self.is_terminated.push(step.is_terminated as i8);
        self.is_truncated.push(step.is_truncated as i8);
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.act.len()
    }

    /// Returns `true` if no step has been taken.
    pub fn is_empty(&self) -> bool {
        self.act.is_empty()
    }

    /// Returns the undiscounted sum of rewards.
    pub fn ret(&self) -> f32 {
        self.reward.iter().sum()
    }

    /// Returns `true` if the last step ended the episode.
    pub fn is_done(&self) -> bool {
        match (self.is_terminated.last(), self.is_truncated.last()) {
            (Some(t), Some(u)) => *t == 1 || *u == 1,
            _ => false,
        }
    }
}

impl<E: Env> Clone for Episode<E> {
    fn clone(&self) -> Self {
        Self {
            obs: self.obs.clone(),
            act: self.act.clone(),
            reward: self.reward.clone(),
            is_terminated: self.is_terminated.clone(),
            is_truncated: self.is_truncated.clone(),
        }
    }
}
