//! Entropy coefficient of SAC.
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{init::Init, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mode of the entropy coefficient of SAC.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum EntCoefMode {
    /// Use a constant as alpha.
    Fix(f64),

    /// Automatic tuning toward a target entropy.
    Auto {
        /// Initial value of alpha.
        init_alpha: f64,

        /// Target entropy, typically the negative of the action dimension.
        target_entropy: f64,

        /// Learning rate of `log_alpha`.
        lr: f64,
    },
}

/// The entropy coefficient of SAC.
///
/// The coefficient is kept in log space as `log_alpha`.
pub struct EntCoef {
    varmap: VarMap,
    log_alpha: Tensor,
    target_entropy: Option<f64>,
    opt: Option<Optimizer>,
}

impl EntCoef {
    /// Constructs an instance of `EntCoef`.
    pub fn new(mode: EntCoefMode, device: Device) -> Result<Self> {
        let varmap = VarMap::new();
        let (init_alpha, target_entropy, lr) = match mode {
            EntCoefMode::Fix(alpha) => (alpha, None, None),
            EntCoefMode::Auto {
                init_alpha,
                target_entropy,
                lr,
            } => (init_alpha, Some(target_entropy), Some(lr)),
        };
        let init = Init::Const(init_alpha.ln());
        let log_alpha = varmap.get(1, "log_alpha", init, DType::F32, &device)?;
        let opt = match lr {
            Some(lr) => Some(
                OptimizerConfig::default()
                    .learning_rate(lr)
                    .build(&varmap)?,
            ),
            None => None,
        };

        Ok(Self {
            varmap,
            log_alpha,
            target_entropy,
            opt,
        })
    }

    /// Returns the entropy coefficient as a tensor of shape `[1]`.
    pub fn alpha(&self) -> Result<Tensor> {
        Ok(self.log_alpha.detach().exp()?)
    }

    /// Returns the entropy coefficient.
    pub fn alpha_scalar(&self) -> Result<f32> {
        Ok(self.alpha()?.sum_all()?.to_scalar::<f32>()?)
    }

    /// Returns `true` if the coefficient is tuned.
    pub fn is_auto(&self) -> bool {
        self.opt.is_some()
    }

    /// Updates `log_alpha` given the log-likelihood of sampled actions.
    ///
    /// Returns the loss, which is zero for a fixed coefficient.
    pub fn update(&mut self, logp: &Tensor) -> Result<f32> {
        match (self.target_entropy, self.opt.as_mut()) {
            (Some(target_entropy), Some(opt)) => {
                let logp = (logp + target_entropy)?.detach();
                let loss = self.log_alpha.broadcast_mul(&logp)?.mean_all()?.neg()?;
                opt.backward_step(&loss)?;
                Ok(loss.to_scalar::<f32>()?)
            }
            _ => Ok(0.0),
        }
    }

    /// Save the parameter into a file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save entropy coefficient to {:?}", path.as_ref());
        Ok(())
    }

    /// Load the parameter from a file.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load entropy coefficient from {:?}", path.as_ref());
        Ok(())
    }

    /// Saves the state of the optimizer, if the coefficient is tuned.
    pub fn save_opt<T: AsRef<Path>>(&self, path: T) -> Result<bool> {
        match &self.opt {
            Some(opt) => opt.save(path).map(|_| true),
            None => Ok(false),
        }
    }

    /// Loads the state of the optimizer, if the coefficient is tuned.
    pub fn load_opt<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        match &mut self.opt {
            Some(opt) => opt.load(path),
            None => Ok(()),
        }
    }
}
