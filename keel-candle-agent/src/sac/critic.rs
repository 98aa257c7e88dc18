//! Critic of SAC agent.
use crate::{
    model::SubModel2,
    opt::{Optimizer, OptimizerConfig},
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
/// Configuration of [`Critic`].
pub struct CriticConfig<Q> {
    /// Configuration of the action-value function.
    pub q_config: Option<Q>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<Q> Default for CriticConfig<Q> {
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> CriticConfig<Q>
where
    Q: DeserializeOwned + Serialize,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`CriticConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CriticConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Represents soft critic for SAC agents.
///
/// It takes observations and actions as inputs and outputs action values.
pub struct Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    varmap: VarMap,

    /// Action-value function
    q: Q,

    opt: Optimizer,
}

impl<Q> Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    /// Constructs [`Critic`].
    pub fn build(config: CriticConfig<Q::Config>, device: Device) -> Result<Critic<Q>> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config)?
        };
        let opt = config.opt_config.build(&varmap)?;

        Ok(Self { varmap, q, opt })
    }

    /// Outputs the action values of shape `[batch_size]`.
    pub fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        Ok(self.q.forward(obs, act)?.squeeze(D::Minus1)?)
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
        info!("Save critic to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load critic from {:?}", path.as_ref());
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
