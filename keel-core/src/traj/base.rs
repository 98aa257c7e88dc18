//! Transition pool.
use super::{BatchBase, GenericTransitionBatch, TrajConfig};
use crate::{
    error::KeelError, Env, Episode, ExperienceBufferBase, ReplayBufferBase, TransitionBatch,
};
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A ring buffer of transitions with episode and step counters.
///
/// `num_epi` and `num_step` count what has been added to the pool over its
/// lifetime, while [`ExperienceBufferBase::len`] is the number of transitions
/// currently stored, which saturates at the capacity.
pub struct Traj<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    capacity: usize,
    i: usize,
    size: usize,
    obs: O,
    act: A,
    next_obs: O,
    reward: Vec<f32>,
    is_terminated: Vec<i8>,
    is_truncated: Vec<i8>,
    num_epi: usize,
    num_step: usize,
    rng: StdRng,
}

fn push_ring<T: Copy>(buf: &mut Vec<T>, capacity: usize, i: usize, data: &[T]) {
    for (j, v) in data.iter().enumerate() {
        let ix = (i + j) % capacity;
        if ix < buf.len() {
            buf[ix] = *v;
        } else {
            buf.push(*v);
        }
    }
}

impl<O, A> Traj<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Returns the number of episodes added to the pool.
    pub fn num_epi(&self) -> usize {
        self.num_epi
    }

    /// Returns the number of environment steps added to the pool.
    pub fn num_step(&self) -> usize {
        self.num_step
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds episodes to the pool.
    ///
    /// Every step `t` of an episode becomes the transition
    /// `(o_t, a_t, o_t+1, r_t)` with the terminal and time-limit flags of the step.
    pub fn add_epis<E>(&mut self, epis: &[Episode<E>]) -> Result<()>
    where
        E: Env,
        E::Obs: Into<O>,
        E::Act: Into<A>,
    {
        for epi in epis.iter() {
            for t in 0..epi.len() {
                self.push(GenericTransitionBatch {
                    obs: epi.obs[t].clone().into(),
                    act: epi.act[t].clone().into(),
                    next_obs: epi.obs[t + 1].clone().into(),
                    reward: vec![epi.reward[t]],
                    is_terminated: vec![epi.is_terminated[t]],
                    is_truncated: vec![epi.is_truncated[t]],
                })?;
            }
            self.num_epi += 1;
            self.num_step += epi.len();
        }
        trace!(
            "Added {} episodes, {} transitions stored",
            epis.len(),
            self.size
        );
        Ok(())
    }

    /// Moves the transitions of `other` into this pool, oldest first.
    ///
    /// The episode and step counters of `other` are added to the counters of
    /// this pool.
    pub fn add_traj(&mut self, other: Traj<O, A>) -> Result<()> {
        if other.size > 0 {
            let ixs = match other.size < other.capacity {
                true => (0..other.size).collect::<Vec<_>>(),
                false => (other.i..other.capacity).chain(0..other.i).collect(),
            };
            self.push(other.gather(&ixs)?)?;
        }
        self.num_epi += other.num_epi;
        self.num_step += other.num_step;
        Ok(())
    }

    fn gather(&self, ixs: &[usize]) -> Result<GenericTransitionBatch<O, A>> {
        Ok(GenericTransitionBatch {
            obs: self.obs.sample(ixs)?,
            act: self.act.sample(ixs)?,
            next_obs: self.next_obs.sample(ixs)?,
            reward: ixs.iter().map(|&ix| self.reward[ix]).collect(),
            is_terminated: ixs.iter().map(|&ix| self.is_terminated[ix]).collect(),
            is_truncated: ixs.iter().map(|&ix| self.is_truncated[ix]).collect(),
        })
    }
}

impl<O, A> ExperienceBufferBase for Traj<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = GenericTransitionBatch<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    /// Adds transitions, overwriting the oldest ones at capacity.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len();
        let (obs, act, next_obs, reward, is_terminated, is_truncated) = tr.unpack();
        self.obs.push(self.i, obs)?;
        self.act.push(self.i, act)?;
        self.next_obs.push(self.i, next_obs)?;
        push_ring(&mut self.reward, self.capacity, self.i, &reward);
        push_ring(&mut self.is_terminated, self.capacity, self.i, &is_terminated);
        push_ring(&mut self.is_truncated, self.capacity, self.i, &is_truncated);

        self.i = (self.i + len) % self.capacity;
        self.size = (self.size + len).min(self.capacity);

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for Traj<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = TrajConfig;
    type Batch = GenericTransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity.max(1);

        Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![],
            is_terminated: vec![],
            is_truncated: vec![],
            num_epi: 0,
            num_step: 0,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Draws `size` transitions uniformly with replacement.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if self.size == 0 {
            return Err(KeelError::EmptyTraj.into());
        }
        let ixs = (0..size)
            .map(|_| self.rng.gen_range(0..self.size))
            .collect::<Vec<_>>();
        self.gather(&ixs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAct, DummyEnv, DummyEnvConfig, DummyObs, DummyTraj};
    use crate::Step;

    fn episode(len: usize, terminate: bool) -> Episode<DummyEnv> {
        let mut epi = Episode::new(DummyObs(0.0));
        for t in 1..=len {
            let last = t == len;
            epi.push(Step::new(
                DummyObs(t as f32),
                DummyAct(t as f32 * 10.0),
                -(t as f32),
                last && terminate,
                last && !terminate,
            ));
        }
        epi
    }

    fn traj(capacity: usize) -> DummyTraj {
        DummyTraj::build(&TrajConfig::default().capacity(capacity).seed(0))
    }

    #[test]
    fn test_add_epis_links_next_obs() -> Result<()> {
        let mut traj = traj(100);
        traj.add_epis(&[episode(3, true), episode(2, false)])?;

        assert_eq!(traj.len(), 5);
        assert_eq!(traj.num_epi(), 2);
        assert_eq!(traj.num_step(), 5);

        let batch = traj.gather(&[0, 1, 2, 3, 4])?;
        assert_eq!(batch.obs.buf, vec![0.0, 1.0, 2.0, 0.0, 1.0]);
        assert_eq!(batch.next_obs.buf, vec![1.0, 2.0, 3.0, 1.0, 2.0]);
        assert_eq!(batch.act.buf, vec![10.0, 20.0, 30.0, 10.0, 20.0]);
        assert_eq!(batch.is_terminated, vec![0, 0, 1, 0, 0]);
        assert_eq!(batch.is_truncated, vec![0, 0, 0, 0, 1]);
        Ok(())
    }

    #[test]
    fn test_empty_inputs() -> Result<()> {
        let mut traj = traj(10);
        traj.add_epis::<DummyEnv>(&[])?;
        assert_eq!(traj.len(), 0);

        // An episode without steps still counts as an episode
        traj.add_epis(&[Episode::<DummyEnv>::new(DummyObs(0.0))])?;
        assert_eq!(traj.len(), 0);
        assert_eq!(traj.num_epi(), 1);

        traj.add_traj(self::traj(10))?;
        assert_eq!(traj.num_epi(), 1);
        assert!(traj.batch(4).is_err());
        Ok(())
    }

    #[test]
    fn test_add_traj_sums_counters() -> Result<()> {
        let mut off = traj(100);
        off.add_epis(&[episode(4, false)])?;

        let mut on = traj(8);
        on.add_epis(&[episode(2, true), episode(3, true)])?;
        off.add_traj(on)?;

        assert_eq!(off.len(), 9);
        assert_eq!(off.num_epi(), 3);
        assert_eq!(off.num_step(), 9);
        let batch = off.gather(&[4, 5, 6])?;
        assert_eq!(batch.next_obs.buf, vec![1.0, 2.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_ring_overwrites_oldest() -> Result<()> {
        let mut traj = traj(4);
        traj.add_epis(&[episode(6, false)])?;

        assert_eq!(traj.len(), 4);
        assert_eq!(traj.num_step(), 6);
        // transitions 4 and 5 replaced 0 and 1
        let batch = traj.gather(&[0, 1, 2, 3])?;
        assert_eq!(batch.obs.buf, vec![4.0, 5.0, 2.0, 3.0]);

        // oldest first when merged
        let mut off = self::traj(10);
        off.add_traj(traj)?;
        let batch = off.gather(&[0, 1, 2, 3])?;
        assert_eq!(batch.obs.buf, vec![2.0, 3.0, 4.0, 5.0]);
        Ok(())
    }

    #[test]
    fn test_batch_is_seeded() -> Result<()> {
        let mut t1 = traj(100);
        let mut t2 = traj(100);
        t1.add_epis(&[episode(20, false)])?;
        t2.add_epis(&[episode(20, false)])?;

        let b1 = t1.batch(16)?;
        let b2 = t2.batch(16)?;
        assert_eq!(b1.len(), 16);
        assert_eq!(b1.obs.buf, b2.obs.buf);
        assert!(b1.obs.buf.iter().all(|&o| (0.0..20.0).contains(&o)));
        Ok(())
    }

    #[test]
    fn test_episodes_from_env() -> Result<()> {
        let config = DummyEnvConfig {
            episode_len: 3,
            terminate_at: None,
        };
        let mut env = DummyEnv::build(&config, 0)?;
        let mut epi = Episode::new(env.reset()?);
        loop {
            let step = env.step(&DummyAct(1.0))?;
            let done = step.is_done();
            epi.push(step);
            if done {
                break;
            }
        }
        assert_eq!(epi.len(), 3);
        assert_eq!(epi.ret(), 3.0);
        assert!(epi.is_done());
        Ok(())
    }
}
