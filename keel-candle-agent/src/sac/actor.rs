//! Actor of SAC agent.
use super::GaussianPolicy;
use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{copy_vars, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Actor`].
pub struct ActorConfig<P> {
    pi_config: Option<P>,
    opt_config: OptimizerConfig,
    min_lstd: f64,
    max_lstd: f64,
    epsilon: f64,
}

impl<P> Default for ActorConfig<P> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::default(),
            min_lstd: -20.0,
            max_lstd: 2.0,
            epsilon: 1e-6,
        }
    }
}

impl<P> ActorConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for the policy network.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        if let Some(pi_config) = &mut self.pi_config {
            pi_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the range of the log standard deviation.
    pub fn lstd_range(mut self, min_lstd: f64, max_lstd: f64) -> Self {
        self.min_lstd = min_lstd;
        self.max_lstd = max_lstd;
        self
    }

    /// Constructs [`ActorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Sum over the last axis of the log density of the standard normal at `z`,
/// scaled by `exp(lstd)`.
fn normal_logp(z: &Tensor, lstd: &Tensor) -> Result<Tensor> {
    let c = 0.5 * (2.0 * std::f64::consts::PI).ln();
    let logp = (((z.sqr()? * -0.5)? - lstd)? - c)?;
    Ok(logp.sum(D::Minus1)?)
}

/// Log determinant of the Jacobian of tanh at the squashed action `a`.
fn tanh_logdet(a: &Tensor, epsilon: f64) -> Result<Tensor> {
    Ok(((1.0 - a.sqr()?)? + epsilon)?.log()?.sum(D::Minus1)?)
}

/// Stochastic policy for SAC agents.
///
/// The action is `tanh(u)` with `u ~ N(mean, exp(lstd))`, where the network outputs
/// `mean` and `lstd` and the latter is clamped to `[min_lstd, max_lstd]`.
pub struct Actor<P>
where
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
{
    device: Device,
    varmap: VarMap,
    pi_config: P::Config,
    pi: P,
    opt: Optimizer,
    min_lstd: f64,
    max_lstd: f64,
    epsilon: f64,
}

impl<P> Actor<P>
where
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: Clone,
{
    /// Constructs [`Actor`].
    pub fn build(config: ActorConfig<P::Config>, device: Device) -> Result<Actor<P>> {
        let pi_config = config.pi_config.context("pi_config is not set.")?;
        let varmap = VarMap::new();
        let pi = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, pi_config.clone())?
        };
        let opt = config.opt_config.build(&varmap)?;

        Ok(Self {
            device,
            varmap,
            pi_config,
            pi,
            opt,
            min_lstd: config.min_lstd,
            max_lstd: config.max_lstd,
            epsilon: config.epsilon,
        })
    }

    /// Outputs the mean and the clamped log standard deviation given observations.
    pub fn forward(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let (mean, lstd) = self.pi.forward(obs)?;
        let lstd = lstd.clamp(self.min_lstd, self.max_lstd)?;
        Ok((mean, lstd))
    }

    /// Samples actions and returns them with their log-likelihood.
    ///
    /// With `reparam`, the actions are differentiable with respect to the parameters.
    /// Otherwise the actions are constants and only the log-likelihood carries the
    /// gradient, as needed by a likelihood-ratio estimator.
    pub fn sample(&self, obs: &Tensor, reparam: bool) -> Result<(Tensor, Tensor)> {
        let (mean, lstd) = self.forward(obs)?;
        let std = lstd.exp()?;
        let z = mean.randn_like(0., 1.)?;

        match reparam {
            true => {
                let a = ((&std * &z)? + &mean)?.tanh()?;
                let log_p = (normal_logp(&z, &lstd)? - tanh_logdet(&a, self.epsilon)?)?;
                Ok((a, log_p))
            }
            false => {
                let u = ((&std * &z)? + &mean)?.detach();
                let a = u.tanh()?;
                let z = ((&u - &mean)? / &std)?;
                let log_p = (normal_logp(&z, &lstd)? - tanh_logdet(&a, self.epsilon)?)?;
                Ok((a, log_p))
            }
        }
    }

    /// Returns a snapshot of the policy with copies of the current parameters.
    pub fn behavior(&self, deterministic: bool) -> Result<GaussianPolicy<P>> {
        let varmap = VarMap::new();
        let pi = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
            P::build(vb, self.pi_config.clone())?
        };
        copy_vars(&varmap, &self.varmap)?;

        Ok(GaussianPolicy::new(
            pi,
            self.device.clone(),
            self.min_lstd,
            self.max_lstd,
            deterministic,
        ))
    }

    /// Does an optimization step given a loss.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Returns the parameters.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save actor to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load actor from {:?}", path.as_ref());
        Ok(())
    }

    /// Saves the state of the optimizer.
    pub fn save_opt<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.opt.save(path)
    }

    /// Loads the state of the optimizer.
    pub fn load_opt<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.opt.load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp2, MlpConfig};

    fn actor() -> Result<Actor<Mlp2>> {
        let config = ActorConfig::default().pi_config(MlpConfig::new(3, vec![16], 2, false));
        Actor::build(config, Device::Cpu)
    }

    #[test]
    fn test_sample_shapes_and_bounds() -> Result<()> {
        let actor = actor()?;
        let obs = Tensor::randn(0f32, 1f32, (10, 3), &Device::Cpu)?;
        for reparam in [true, false] {
            let (a, log_p) = actor.sample(&obs, reparam)?;
            assert_eq!(a.dims(), [10, 2]);
            assert_eq!(log_p.dims(), [10]);
            let a = a.flatten_all()?.to_vec1::<f32>()?;
            assert!(a.iter().all(|v| (-1.0..=1.0).contains(v)));
            assert!(log_p.to_vec1::<f32>()?.iter().all(|v| v.is_finite()));
        }
        Ok(())
    }

    #[test]
    fn test_lstd_is_clamped() -> Result<()> {
        let config = ActorConfig::default()
            .pi_config(MlpConfig::new(3, vec![16], 2, false))
            .lstd_range(-0.5, -0.5);
        let actor = Actor::<Mlp2>::build(config, Device::Cpu)?;
        let obs = Tensor::randn(0f32, 1f32, (4, 3), &Device::Cpu)?;
        let (_, lstd) = actor.forward(&obs)?;
        let lstd = lstd.flatten_all()?.to_vec1::<f32>()?;
        assert!(lstd.iter().all(|v| *v == -0.5));
        Ok(())
    }

    #[test]
    fn test_logp_of_standard_normal() -> Result<()> {
        // log N(0; 0, 1) in a single dimension
        let z = Tensor::new(&[[0f32]], &Device::Cpu)?;
        let lstd = Tensor::new(&[[0f32]], &Device::Cpu)?;
        let logp = normal_logp(&z, &lstd)?.to_vec1::<f32>()?;
        assert!((logp[0] + 0.918_938_5).abs() < 1e-5);

        // The scale enters through -log(std)
        let lstd = Tensor::new(&[[1f32]], &Device::Cpu)?;
        let logp = normal_logp(&z, &lstd)?.to_vec1::<f32>()?;
        assert!((logp[0] + 1.918_938_5).abs() < 1e-5);

        let a = Tensor::new(&[[0f32, 0.]], &Device::Cpu)?;
        let logdet = tanh_logdet(&a, 0.0)?.to_vec1::<f32>()?;
        assert_eq!(logdet, vec![0.0]);
        Ok(())
    }

    #[test]
    fn test_behavior_is_a_copy() -> Result<()> {
        let mut actor = actor()?;
        let pol = actor.behavior(true)?;
        assert!(pol.is_deterministic());
        let obs = Tensor::ones((1, 3), DType::F32, &Device::Cpu)?;
        let a0 = pol.act(&obs)?.flatten_all()?.to_vec1::<f32>()?;
        let (mean, _) = actor.forward(&obs)?;
        assert_eq!(a0, mean.tanh()?.flatten_all()?.to_vec1::<f32>()?);

        // Training the actor leaves the snapshot untouched
        let (_, log_p) = actor.sample(&obs, true)?;
        actor.backward_step(&log_p.mean_all()?)?;
        let a1 = pol.act(&obs)?.flatten_all()?.to_vec1::<f32>()?;
        assert_eq!(a0, a1);
        let (mean, _) = actor.forward(&obs)?;
        assert_ne!(a0, mean.tanh()?.flatten_all()?.to_vec1::<f32>()?);
        Ok(())
    }
}
