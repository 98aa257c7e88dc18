//! Episodic sampling with worker threads.
//!
//! [`EpiSampler`] owns one environment per worker. On [`EpiSampler::sample`], every
//! worker rolls out whole episodes with its own copy of the given policy until the
//! shared step budget is used up. A worker never stops in the middle of an episode,
//! so the returned episodes hold at least `max_steps` environment steps in total.
use crate::{error::KeelError, Env, Episode, Policy};
use anyhow::Result;
use crossbeam_channel::unbounded;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

/// Configuration of [`EpiSampler`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpiSamplerConfig {
    /// The number of worker threads, each with its own environment.
    pub num_parallel: usize,

    /// Base seed of the environments. Worker `i` gets `seed + i`.
    pub seed: i64,
}

impl Default for EpiSamplerConfig {
    fn default() -> Self {
        Self {
            num_parallel: 4,
            seed: 256,
        }
    }
}

impl EpiSamplerConfig {
    /// Sets the number of workers.
    pub fn num_parallel(mut self, v: usize) -> Self {
        self.num_parallel = v;
        self
    }

    /// Sets the base seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }
}

/// Collects whole episodes with a number of worker threads.
pub struct EpiSampler<E: Env> {
    envs: Vec<E>,
}

impl<E> EpiSampler<E>
where
    E: Env + Send,
    E::Obs: Send,
    E::Act: Send,
{
    /// Builds `config.num_parallel` environments.
    pub fn build(env_config: &E::Config, config: &EpiSamplerConfig) -> Result<Self> {
        if config.num_parallel == 0 {
            return Err(KeelError::NoWorkers(config.num_parallel).into());
        }
        let envs = (0..config.num_parallel)
            .map(|i| E::build(env_config, config.seed + i as i64))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { envs })
    }

    /// Returns the number of workers.
    pub fn num_parallel(&self) -> usize {
        self.envs.len()
    }

    /// Samples episodes with `pol` until at least `max_steps` steps are collected.
    ///
    /// Episodes are ordered by worker, then by completion within a worker.
    pub fn sample<P>(&mut self, pol: &P, max_steps: usize) -> Result<Vec<Episode<E>>>
    where
        P: Policy<E> + Clone + Send,
    {
        if max_steps == 0 {
            return Ok(vec![]);
        }

        let n_steps = AtomicUsize::new(0);
        let (sender, receiver) = unbounded::<(usize, Episode<E>)>();

        thread::scope(|s| -> Result<()> {
            let handles = self
                .envs
                .iter_mut()
                .enumerate()
                .map(|(id, env)| {
                    let mut pol = pol.clone();
                    let sender = sender.clone();
                    let n_steps = &n_steps;
                    s.spawn(move || -> Result<()> {
                        let mut n_epis = 0;
                        while n_steps.load(Ordering::SeqCst) < max_steps {
                            let epi = rollout(env, &mut pol)?;
                            n_steps.fetch_add(epi.len(), Ordering::SeqCst);
                            n_epis += 1;
                            // The receiver outlives the scope
                            let _ = sender.send((id, epi));
                        }
                        debug!("Worker {} finished {} episodes", id, n_epis);
                        Ok(())
                    })
                })
                .collect::<Vec<_>>();

            // Every worker is joined before an error is returned
            let results = handles
                .into_iter()
                .enumerate()
                .map(|(id, handle)| match handle.join() {
                    Ok(res) => res,
                    Err(_) => Err(KeelError::WorkerPanicked(id).into()),
                })
                .collect::<Vec<_>>();
            results.into_iter().collect::<Result<()>>()
        })?;
        drop(sender);

        // Stable sort keeps the completion order within a worker
        let mut epis = receiver.into_iter().collect::<Vec<_>>();
        epis.sort_by_key(|(id, _)| *id);

        Ok(epis.into_iter().map(|(_, epi)| epi).collect())
    }
}

/// Runs a single episode to its end.
fn rollout<E: Env, P: Policy<E>>(env: &mut E, pol: &mut P) -> Result<Episode<E>> {
    let mut obs = env.reset()?;
    let mut epi = Episode::new(obs.clone());
    loop {
        let act = pol.sample(&obs)?;
        let step = env.step(&act)?;
        let is_done = step.is_done();
        obs = step.obs.clone();
        epi.push(step);
        if is_done {
            return Ok(epi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAct, DummyEnv, DummyEnvConfig, DummyObs, DummyPolicy};
    use std::sync::Arc;

    fn env_config(episode_len: usize) -> DummyEnvConfig {
        DummyEnvConfig {
            episode_len,
            terminate_at: None,
        }
    }

    #[test]
    fn test_seeds_per_worker() -> Result<()> {
        let config = EpiSamplerConfig::default().num_parallel(3).seed(10);
        let sampler = EpiSampler::<DummyEnv>::build(&env_config(5), &config)?;
        let seeds = sampler.envs.iter().map(|e| e.seed).collect::<Vec<_>>();
        assert_eq!(seeds, vec![10, 11, 12]);
        Ok(())
    }

    #[test]
    fn test_no_workers() {
        let config = EpiSamplerConfig::default().num_parallel(0);
        assert!(EpiSampler::<DummyEnv>::build(&env_config(5), &config).is_err());
    }

    #[test]
    fn test_step_budget() -> Result<()> {
        let config = EpiSamplerConfig::default().num_parallel(4);
        let mut sampler = EpiSampler::<DummyEnv>::build(&env_config(7), &config)?;
        let epis = sampler.sample(&DummyPolicy(0.5), 50)?;

        let n_steps: usize = epis.iter().map(|e| e.len()).sum();
        assert!(n_steps >= 50);
        // Each worker overshoots by at most one episode
        assert!(n_steps < 50 + 4 * 7);
        for epi in epis.iter() {
            assert_eq!(epi.len(), 7);
            assert_eq!(epi.obs.len(), 8);
            assert!(epi.is_done());
            assert_eq!(epi.ret(), 3.5);
        }
        Ok(())
    }

    #[test]
    fn test_zero_budget() -> Result<()> {
        let config = EpiSamplerConfig::default().num_parallel(2);
        let mut sampler = EpiSampler::<DummyEnv>::build(&env_config(3), &config)?;
        assert!(sampler.sample(&DummyPolicy(1.0), 0)?.is_empty());
        assert!(!sampler.sample(&DummyPolicy(1.0), 1)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_termination_ends_episode() -> Result<()> {
        let env_config = DummyEnvConfig {
            episode_len: 10,
            terminate_at: Some(4),
        };
        let config = EpiSamplerConfig::default().num_parallel(1);
        let mut sampler = EpiSampler::<DummyEnv>::build(&env_config, &config)?;
        let epis = sampler.sample(&DummyPolicy(1.0), 8)?;
        assert_eq!(epis.len(), 2);
        assert!(epis
            .iter()
            .all(|e| e.is_terminated == vec![0, 0, 0, 1] && e.is_truncated == vec![0; 4]));
        Ok(())
    }

    /// Policy failing at the given step.
    #[derive(Clone)]
    struct FailingPolicy(usize);

    impl Policy<DummyEnv> for FailingPolicy {
        fn sample(&mut self, obs: &DummyObs) -> Result<DummyAct> {
            if obs.0 as usize == self.0 {
                anyhow::bail!("policy failure at {}", self.0);
            }
            Ok(DummyAct(0.0))
        }
    }

    #[test]
    fn test_worker_error_propagates() -> Result<()> {
        let config = EpiSamplerConfig::default().num_parallel(2);
        let mut sampler = EpiSampler::<DummyEnv>::build(&env_config(5), &config)?;
        let err = sampler.sample(&FailingPolicy(2), 10);
        assert!(err.is_err());
        Ok(())
    }

    /// Policy panicking at the given step, after a delay.
    #[derive(Clone)]
    struct PanickingPolicy(usize);

    impl Policy<DummyEnv> for PanickingPolicy {
        fn sample(&mut self, obs: &DummyObs) -> Result<DummyAct> {
            if obs.0 as usize == self.0 {
                std::thread::sleep(std::time::Duration::from_millis(100));
                panic!("policy panic at {}", self.0);
            }
            Ok(DummyAct(0.0))
        }
    }

    /// Policy whose first copy fails and whose second copy panics.
    struct MixedPolicy {
        n_clones: Arc<AtomicUsize>,
        role: usize,
    }

    impl Clone for MixedPolicy {
        fn clone(&self) -> Self {
            Self {
                n_clones: self.n_clones.clone(),
                role: self.n_clones.fetch_add(1, Ordering::SeqCst),
            }
        }
    }

    impl Policy<DummyEnv> for MixedPolicy {
        fn sample(&mut self, obs: &DummyObs) -> Result<DummyAct> {
            match self.role {
                0 => FailingPolicy(1).sample(obs),
                _ => PanickingPolicy(1).sample(obs),
            }
        }
    }

    #[test]
    fn test_worker_error_and_panic() -> Result<()> {
        let config = EpiSamplerConfig::default().num_parallel(2);
        let mut sampler = EpiSampler::<DummyEnv>::build(&env_config(5), &config)?;
        let pol = MixedPolicy {
            n_clones: Arc::new(AtomicUsize::new(0)),
            role: 0,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sampler.sample(&pol, 10)
        }));
        let err = res.expect("sampling must not panic").unwrap_err();
        assert!(err.to_string().contains("policy failure"));
        Ok(())
    }

    #[test]
    fn test_worker_panic_is_error() -> Result<()> {
        let config = EpiSamplerConfig::default().num_parallel(2);
        let mut sampler = EpiSampler::<DummyEnv>::build(&env_config(5), &config)?;
        let err = sampler.sample(&PanickingPolicy(1), 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KeelError>(),
            Some(KeelError::WorkerPanicked(_))
        ));
        Ok(())
    }

    #[test]
    fn test_rollout() -> Result<()> {
        let mut env = DummyEnv::build(&env_config(2), 0)?;
        let epi = rollout(&mut env, &mut DummyPolicy(2.0))?;
        assert_eq!(epi.obs, vec![DummyObs(0.0), DummyObs(1.0), DummyObs(2.0)]);
        assert_eq!(epi.reward, vec![2.0, 2.0]);
        Ok(())
    }
}
