//! Optimizers.
//!
//! [`Optimizer`] implements Adam and AdamW over the variables of a [`VarMap`].
//! The moment estimates are keyed by variable name, so that the state can be saved
//! to and restored from a safetensors file alongside the parameters.
use crate::util::named_vars;
use anyhow::{anyhow, Result};
use candle_core::{backprop::GradStore, Device, Tensor, Var};
use candle_nn::VarMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

const STEP_KEY: &str = "__step__";

/// Configuration of optimizer for training neural networks in an RL agent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// AdamW optimizer, Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        #[serde(default = "default_beta1")]
        /// Decay rate of the first moment.
        beta1: f64,
        #[serde(default = "default_beta2")]
        /// Decay rate of the second moment.
        beta2: f64,
        #[serde(default = "default_eps")]
        /// Term added to the denominator.
        eps: f64,
        #[serde(default = "default_weight_decay")]
        /// Weight decay.
        weight_decay: f64,
    },

    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
        #[serde(default = "default_beta1")]
        /// Decay rate of the first moment.
        beta1: f64,
        #[serde(default = "default_beta2")]
        /// Decay rate of the second moment.
        beta2: f64,
        #[serde(default = "default_eps")]
        /// Term added to the denominator.
        eps: f64,
    },
}

fn default_beta1() -> f64 {
    0.9
}

fn default_beta2() -> f64 {
    0.999
}

fn default_eps() -> f64 {
    1e-8
}

fn default_weight_decay() -> f64 {
    0.01
}

impl OptimizerConfig {
    /// Constructs an optimizer over all variables in `varmap`.
    pub fn build(&self, varmap: &VarMap) -> Result<Optimizer> {
        // Adam is AdamW without decay
        let (lr, beta1, beta2, eps, weight_decay) = match *self {
            Self::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => (lr, beta1, beta2, eps, weight_decay),
            Self::Adam {
                lr,
                beta1,
                beta2,
                eps,
            } => (lr, beta1, beta2, eps, 0.0),
        };
        let vars = named_vars(varmap)?
            .into_iter()
            .map(|(name, var)| {
                let m = var.zeros_like()?;
                let v = var.zeros_like()?;
                Ok(VarState { name, var, m, v })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Optimizer {
            lr,
            beta1,
            beta2,
            eps,
            weight_decay,
            vars,
            step: 0,
        })
    }

    /// Override learning rate.
    pub fn learning_rate(self, lr: f64) -> Self {
        match self {
            Self::AdamW {
                lr: _,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => Self::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            },
            Self::Adam {
                lr: _,
                beta1,
                beta2,
                eps,
            } => Self::Adam {
                lr,
                beta1,
                beta2,
                eps,
            },
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            lr: 1e-3,
            beta1: default_beta1(),
            beta2: default_beta2(),
            eps: default_eps(),
        }
    }
}

struct VarState {
    name: String,
    var: Var,
    m: Tensor,
    v: Tensor,
}

/// Adam optimizer with bias correction.
pub struct Optimizer {
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    weight_decay: f64,
    vars: Vec<VarState>,
    step: usize,
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let grads = loss.backward()?;
        self.step(&grads)
    }

    /// Updates the variables with the given gradients.
    ///
    /// Variables without a gradient keep their values and moments.
    pub fn step(&mut self, grads: &GradStore) -> Result<()> {
        self.step += 1;
        let bias1 = 1.0 - self.beta1.powi(self.step as i32);
        let bias2 = 1.0 - self.beta2.powi(self.step as i32);
        let lr = self.lr;

        for state in self.vars.iter_mut() {
            let theta = state.var.as_tensor();
            let g = match grads.get(theta) {
                Some(g) => g,
                None => continue,
            };
            let theta = (theta * (1.0 - lr * self.weight_decay))?;

            let m = ((&state.m * self.beta1)? + (g * (1.0 - self.beta1))?)?;
            let v = ((&state.v * self.beta2)? + (g.sqr()? * (1.0 - self.beta2))?)?;
            let m_hat = (&m / bias1)?;
            let v_hat = (&v / bias2)?;
            let delta = (m_hat / (v_hat.sqrt()? + self.eps)?)?;
            state.var.set(&(theta - (delta * lr)?)?)?;
            state.m = m.detach();
            state.v = v.detach();
        }

        Ok(())
    }

    /// Returns the number of steps taken.
    pub fn n_steps(&self) -> usize {
        self.step
    }

    /// Saves the moment estimates and the step count.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let mut tensors = HashMap::new();
        for state in self.vars.iter() {
            tensors.insert(format!("{}.m", state.name), state.m.clone());
            tensors.insert(format!("{}.v", state.name), state.v.clone());
        }
        tensors.insert(
            STEP_KEY.to_string(),
            Tensor::new(&[self.step as f64], &Device::Cpu)?,
        );
        candle_core::safetensors::save(&tensors, path.as_ref())?;
        info!("Save optimizer state to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the state saved with [`Optimizer::save`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let path = path.as_ref();
        let device = match self.vars.first() {
            Some(state) => state.var.device().clone(),
            None => Device::Cpu,
        };
        let mut tensors = candle_core::safetensors::load(path, &device)?;
        let mut take = |key: String| {
            tensors
                .remove(&key)
                .ok_or_else(|| anyhow!("{} is not in {:?}", key, path))
        };

        let step = take(STEP_KEY.to_string())?.to_device(&Device::Cpu)?.to_vec1::<f64>()?;
        let step = step
            .first()
            .ok_or_else(|| anyhow!("Empty step count in {:?}", path))?;
        let mut moments = vec![];
        for state in self.vars.iter() {
            let m = take(format!("{}.m", state.name))?;
            let v = take(format!("{}.v", state.name))?;
            if m.dims() != state.var.dims() || v.dims() != state.var.dims() {
                return Err(anyhow!("Shape mismatch of {} in {:?}", state.name, path));
            }
            moments.push((m, v));
        }

        for (state, (m, v)) in self.vars.iter_mut().zip(moments.into_iter()) {
            state.m = m;
            state.v = v;
        }
        self.step = *step as usize;
        info!("Load optimizer state from {:?}", path);
        Ok(())
    }
}
