//! Snapshot of the actor for sampling.
use crate::{model::SubModel1, TensorBatch};
use anyhow::Result;
use candle_core::{Device, Tensor};
use keel_core::{Env, Policy};

/// Tanh-squashed Gaussian policy detached from the agent.
///
/// The parameters are copies of the actor's at the time the policy was taken,
/// so it can be cloned into sampler workers while the actor is trained.
#[derive(Clone)]
pub struct GaussianPolicy<P> {
    pi: P,
    device: Device,
    min_lstd: f64,
    max_lstd: f64,
    deterministic: bool,
}

impl<P> GaussianPolicy<P>
where
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
{
    pub(super) fn new(
        pi: P,
        device: Device,
        min_lstd: f64,
        max_lstd: f64,
        deterministic: bool,
    ) -> Self {
        Self {
            pi,
            device,
            min_lstd,
            max_lstd,
            deterministic,
        }
    }

    /// Returns `true` if the policy outputs the squashed mean.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Returns actions in `[-1, 1]` for a batch of observations.
    pub fn act(&self, obs: &Tensor) -> Result<Tensor> {
        let (mean, lstd) = self.pi.forward(obs)?;
        let u = match self.deterministic {
            true => mean,
            false => {
                let std = lstd.clamp(self.min_lstd, self.max_lstd)?.exp()?;
                (mean.randn_like(0., 1.)?.mul(&std)? + mean)?
            }
        };
        Ok(u.tanh()?.detach())
    }
}

impl<E, P> Policy<E> for GaussianPolicy<P>
where
    E: Env,
    E::Obs: Into<TensorBatch>,
    E::Act: From<TensorBatch>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
{
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs: TensorBatch = obs.clone().into();
        let act = self.act(&obs.to_tensor(&self.device)?)?;
        Ok(TensorBatch::from_tensor(&act)?.into())
    }
}
