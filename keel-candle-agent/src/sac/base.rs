use super::{Actor, Critic, EntCoef, GaussianPolicy, SacConfig};
use crate::{
    model::{SubModel1, SubModel2},
    util::{copy_vars, track},
    TensorBatch,
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use keel_core::{
    error::KeelError,
    record::{Record, RecordValue},
    Agent, Env, Policy, ReplayBufferBase, TransitionBatch,
};
use log::trace;
use std::{
    convert::TryFrom,
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};

fn file_name(name: &str, tag: &str) -> String {
    format!("{}_{}.safetensors", name, tag)
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Soft actor critic (SAC) agent.
///
/// An optimization step takes a batch from the replay buffer and updates the
/// models in the following order:
///
/// ```mermaid
/// graph LR
///     A[critics]-->B[actor]
///     B-->C[entropy coefficient]
///     C-->D[target critics]
/// ```
///
/// The critics regress on `r + gamma * (1 - terminated) * (min Q'(s', a') - alpha * log pi(a'|s'))`
/// with `a' ~ pi(s')`. Time-limit truncation does not stop bootstrapping.
/// The target critics follow the critics by soft updates with rate `tau`.
pub struct Sac<E, Q, P, R>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
{
    actor: Actor<P>,
    qfs: Vec<Critic<Q>>,
    targ_qfs: Vec<Critic<Q>>,
    ent_coef: EntCoef,
    gamma: f64,
    tau: f64,
    batch_size: usize,
    sampling: usize,
    reparam: bool,
    train: bool,
    n_opts: usize,
    device: Device,
    phantom: PhantomData<(E, R)>,
}

impl<E, Q, P, R> Sac<E, Q, P, R>
where
    E: Env,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    Q::Config: Clone,
    P::Config: Clone,
    R: ReplayBufferBase,
    R::Batch: TransitionBatch<ObsBatch = TensorBatch, ActBatch = TensorBatch>,
{
    /// Constructs [`Sac`] agent.
    ///
    /// The target critics are initialized with the parameters of the critics.
    pub fn build(config: SacConfig<Q::Config, P::Config>) -> Result<Self> {
        if config.n_critics == 0 {
            let msg = "n_critics must be positive".to_string();
            return Err(KeelError::InvalidConfig(msg).into());
        }
        if config.sampling == 0 {
            let msg = "sampling must be positive".to_string();
            return Err(KeelError::InvalidConfig(msg).into());
        }
        let device = match config.device {
            Some(device) => Device::try_from(device)?,
            None => Device::Cpu,
        };
        let actor = Actor::build(config.actor_config, device.clone())?;
        let mut qfs = vec![];
        let mut targ_qfs = vec![];
        for _ in 0..config.n_critics {
            let qf = Critic::build(config.critic_config.clone(), device.clone())?;
            let targ_qf = Critic::build(config.critic_config.clone(), device.clone())?;
            copy_vars(targ_qf.varmap(), qf.varmap())?;
            qfs.push(qf);
            targ_qfs.push(targ_qf);
        }
        let ent_coef = EntCoef::new(config.ent_coef_mode, device.clone())?;

        Ok(Self {
            actor,
            qfs,
            targ_qfs,
            ent_coef,
            gamma: config.gamma,
            tau: config.tau,
            batch_size: config.batch_size,
            sampling: config.sampling,
            reparam: config.reparam,
            train: false,
            n_opts: 0,
            device,
            phantom: PhantomData,
        })
    }

    /// Returns the number of optimization steps done so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Returns the actor.
    pub fn actor(&self) -> &Actor<P> {
        &self.actor
    }

    /// Returns the critics.
    pub fn qfs(&self) -> &[Critic<Q>] {
        &self.qfs
    }

    /// Returns the target critics.
    pub fn targ_qfs(&self) -> &[Critic<Q>] {
        &self.targ_qfs
    }

    fn qvals_min(qfs: &[Critic<Q>], obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        let qs = qfs
            .iter()
            .map(|qf| qf.forward(obs, act))
            .collect::<Result<Vec<_>>>()?;
        Ok(Tensor::stack(&qs, 0)?.min(0)?)
    }

    fn update_critic(
        &mut self,
        obs: &Tensor,
        act: &Tensor,
        next_obs: &Tensor,
        reward: Vec<f32>,
        is_terminated: Vec<i8>,
    ) -> Result<f32> {
        let n = reward.len();
        let tgt = {
            let reward = Tensor::from_vec(reward, (n,), &self.device)?;
            let not_done = is_terminated
                .iter()
                .map(|t| 1.0 - *t as f32)
                .collect::<Vec<_>>();
            let not_done = Tensor::from_vec(not_done, (n,), &self.device)?;
            let (next_act, next_logp) = self.actor.sample(next_obs, true)?;
            let next_q = Self::qvals_min(&self.targ_qfs, next_obs, &next_act)?;
            let alpha = self.ent_coef.alpha()?;
            let next_v = (next_q - alpha.broadcast_mul(&next_logp)?)?;
            (reward + ((not_done * self.gamma)? * next_v)?)?.detach()
        };

        let mut loss_sum = 0f32;
        for qf in self.qfs.iter_mut() {
            let q = qf.forward(obs, act)?;
            let loss = ((q - &tgt)?.sqr()?.mean_all()? * 0.5)?;
            qf.backward_step(&loss)?;
            loss_sum += loss.to_scalar::<f32>()?;
        }

        Ok(loss_sum / self.qfs.len() as f32)
    }

    /// Returns the loss of the actor and the log-likelihood of the sampled actions.
    fn update_actor(&mut self, obs: &Tensor) -> Result<(f32, Tensor)> {
        let obs = obs.repeat((self.sampling, 1))?;
        let (act, logp) = self.actor.sample(&obs, self.reparam)?;
        let q = Self::qvals_min(&self.qfs, &obs, &act)?;
        let alpha = self.ent_coef.alpha()?;
        let adv = (alpha.broadcast_mul(&logp)? - q)?;
        let loss = match self.reparam {
            true => adv.mean_all()?,
            false => (&logp * adv.detach())?.mean_all()?,
        };
        self.actor.backward_step(&loss)?;

        Ok((loss.to_scalar::<f32>()?, logp.detach()))
    }

    fn soft_update(&mut self) -> Result<()> {
        for (targ_qf, qf) in self.targ_qfs.iter().zip(self.qfs.iter()) {
            track(targ_qf.varmap(), qf.varmap(), self.tau)?;
        }
        Ok(())
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let batch = buffer.batch(self.batch_size)?;
        let (obs, act, next_obs, reward, is_terminated, _) = batch.unpack();
        let obs = obs.to_tensor(&self.device)?;
        let act = act.to_tensor(&self.device)?;
        let next_obs = next_obs.to_tensor(&self.device)?;

        let qf_loss = self.update_critic(&obs, &act, &next_obs, reward, is_terminated)?;
        let (pol_loss, logp) = self.update_actor(&obs)?;
        let alpha_loss = self.ent_coef.update(&logp)?;
        self.soft_update()?;
        self.n_opts += 1;
        trace!(
            "opt {}: QfLoss {}, PolLoss {}, AlphaLoss {}",
            self.n_opts,
            qf_loss,
            pol_loss,
            alpha_loss
        );

        Ok(Record::from_slice(&[
            ("PolLoss", RecordValue::Scalar(pol_loss)),
            ("QfLoss", RecordValue::Scalar(qf_loss)),
            ("AlphaLoss", RecordValue::Scalar(alpha_loss)),
            ("Alpha", RecordValue::Scalar(self.ent_coef.alpha_scalar()?)),
        ]))
    }
}

impl<E, Q, P, R> Policy<E> for Sac<E, Q, P, R>
where
    E: Env,
    E::Obs: Into<TensorBatch>,
    E::Act: From<TensorBatch>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: Clone,
{
    /// Samples an action in training mode and returns the squashed mean otherwise.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs: TensorBatch = obs.clone().into();
        let obs = obs.to_tensor(&self.device)?;
        let act = match self.train {
            true => self.actor.sample(&obs, true)?.0,
            false => self.actor.forward(&obs)?.0.tanh()?,
        };
        Ok(TensorBatch::from_tensor(&act.detach())?.into())
    }
}

impl<E, Q, P, R> Agent<E, R> for Sac<E, Q, P, R>
where
    E: Env,
    E::Obs: Into<TensorBatch>,
    E::Act: From<TensorBatch>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)> + Clone + Send,
    Q::Config: Clone,
    P::Config: Clone,
    R: ReplayBufferBase,
    R::Batch: TransitionBatch<ObsBatch = TensorBatch, ActBatch = TensorBatch>,
{
    type Behavior = GaussianPolicy<P>;

    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn behavior_policy(&self) -> Result<GaussianPolicy<P>> {
        self.actor.behavior(!self.train)
    }

    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record> {
        self.opt_(buffer)
    }

    /// Saves the parameters and the optimizer states as `<name>_<tag>.safetensors`.
    ///
    /// The names are `pol`, `qf<i>`, `targ_qf<i>`, `optim_pol`, `optim_qf<i>` and
    /// `log_alpha`, with `i` counted from 1, and `optim_alpha` if the entropy
    /// coefficient is tuned.
    fn save_params(&self, dir: &Path, tag: &str) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut paths = vec![];

        let path = dir.join(file_name("pol", tag));
        self.actor.save(&path)?;
        paths.push(path);
        let path = dir.join(file_name("optim_pol", tag));
        self.actor.save_opt(&path)?;
        paths.push(path);

        for (i, (qf, targ_qf)) in self.qfs.iter().zip(self.targ_qfs.iter()).enumerate() {
            let path = dir.join(file_name(&format!("qf{}", i + 1), tag));
            qf.save(&path)?;
            paths.push(path);
            let path = dir.join(file_name(&format!("targ_qf{}", i + 1), tag));
            targ_qf.save(&path)?;
            paths.push(path);
            let path = dir.join(file_name(&format!("optim_qf{}", i + 1), tag));
            qf.save_opt(&path)?;
            paths.push(path);
        }

        let path = dir.join(file_name("log_alpha", tag));
        self.ent_coef.save(&path)?;
        paths.push(path);
        let path = dir.join(file_name("optim_alpha", tag));
        if self.ent_coef.save_opt(&path)? {
            paths.push(path);
        }

        Ok(paths)
    }

    fn load_params(&mut self, dir: &Path, tag: &str) -> Result<()> {
        self.actor.load(dir.join(file_name("pol", tag)))?;
        self.actor.load_opt(dir.join(file_name("optim_pol", tag)))?;

        for (i, (qf, targ_qf)) in self
            .qfs
            .iter_mut()
            .zip(self.targ_qfs.iter_mut())
            .enumerate()
        {
            qf.load(dir.join(file_name(&format!("qf{}", i + 1), tag)))?;
            targ_qf.load(dir.join(file_name(&format!("targ_qf{}", i + 1), tag)))?;
            qf.load_opt(dir.join(file_name(&format!("optim_qf{}", i + 1), tag)))?;
        }

        self.ent_coef.load(dir.join(file_name("log_alpha", tag)))?;
        self.ent_coef
            .load_opt(dir.join(file_name("optim_alpha", tag)))?;

        Ok(())
    }
}
