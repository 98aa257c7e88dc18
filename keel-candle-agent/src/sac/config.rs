//! Configuration of SAC agent.
use super::{ActorConfig, CriticConfig, EntCoefMode};
use crate::Device;
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Sac`](super::Sac).
///
/// `Q` and `P` are the configurations of the action-value function and the
/// policy network, respectively.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SacConfig<Q, P> {
    /// Configuration of the actor.
    pub actor_config: ActorConfig<P>,

    /// Configuration of the critics.
    pub critic_config: CriticConfig<Q>,

    /// Discount factor.
    pub gamma: f64,

    /// Rate of the soft update of the target critics.
    pub tau: f64,

    /// How to update entropy coefficient.
    pub ent_coef_mode: EntCoefMode,

    /// Batch size for training.
    pub batch_size: usize,

    /// The number of actions sampled per observation in the actor loss.
    pub sampling: usize,

    /// Use the reparameterization trick in the actor loss. If `false`, the
    /// likelihood-ratio gradient is used.
    pub reparam: bool,

    /// The number of critics.
    pub n_critics: usize,

    /// Device for actor/critic models.
    pub device: Option<Device>,
}

impl<Q, P> Default for SacConfig<Q, P> {
    fn default() -> Self {
        Self {
            actor_config: Default::default(),
            critic_config: Default::default(),
            gamma: 0.99,
            tau: 5e-3,
            ent_coef_mode: EntCoefMode::Fix(1.0),
            batch_size: 256,
            sampling: 1,
            reparam: true,
            n_critics: 2,
            device: None,
        }
    }
}

impl<Q, P> SacConfig<Q, P>
where
    Q: DeserializeOwned + Serialize,
    P: DeserializeOwned + Serialize,
{
    /// Sets the configuration of the actor.
    pub fn actor_config(mut self, actor_config: ActorConfig<P>) -> Self {
        self.actor_config = actor_config;
        self
    }

    /// Sets the configuration of the critics.
    pub fn critic_config(mut self, critic_config: CriticConfig<Q>) -> Self {
        self.critic_config = critic_config;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Rate of the soft update.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// SAC-alpha.
    pub fn ent_coef_mode(mut self, v: EntCoefMode) -> Self {
        self.ent_coef_mode = v;
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// The number of action samples per observation.
    pub fn sampling(mut self, v: usize) -> Self {
        self.sampling = v;
        self
    }

    /// Use the reparameterization trick.
    pub fn reparam(mut self, v: bool) -> Self {
        self.reparam = v;
        self
    }

    /// The number of critics.
    pub fn n_critics(mut self, v: usize) -> Self {
        self.n_critics = v;
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Constructs [`SacConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SacConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::MlpConfig;
    use tempdir::TempDir;

    #[test]
    fn test_serde_sac_config() -> Result<()> {
        let config = SacConfig::default()
            .actor_config(ActorConfig::default().pi_config(MlpConfig::new(3, vec![64, 64], 1, false)))
            .critic_config(CriticConfig::default().q_config(MlpConfig::new(4, vec![64, 64], 1, false)))
            .ent_coef_mode(EntCoefMode::Auto {
                init_alpha: 1.0,
                target_entropy: -1.0,
                lr: 1e-4,
            })
            .sampling(4)
            .reparam(false)
            .device(Device::Cpu);

        let dir = TempDir::new("sac_config")?;
        let path = dir.path().join("sac.yaml");
        config.save(&path)?;
        let config_ = SacConfig::<MlpConfig, MlpConfig>::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
