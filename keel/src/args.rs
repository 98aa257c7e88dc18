//! Command-line arguments of `keel-sac`.
use clap::Parser;
use serde::Serialize;

/// Train a soft actor-critic agent on a Gym-style environment
#[derive(Parser, Debug, Clone, Serialize)]
#[command(version, about)]
pub struct Args {
    /// Directory for the progress log, the arguments and the checkpoints
    #[arg(long, default_value = "garbage")]
    pub log: String,

    /// Name of the environment
    #[arg(long = "env_name", default_value = "Pendulum-v0")]
    pub env_name: String,

    /// Write selected episodes as CSV files under <log>/episodes
    #[arg(long, default_value_t = false)]
    pub record: bool,

    /// Random seed of the environments and the replay pool
    #[arg(long, default_value_t = 256)]
    pub seed: i64,

    /// Training stops once this many episodes have been sampled
    #[arg(long = "max_episodes", default_value_t = 1_000_000)]
    pub max_episodes: usize,

    /// The number of sampler workers
    #[arg(long = "num_parallel", default_value_t = 4)]
    pub num_parallel: usize,

    /// CUDA device ordinal, negative for CPU
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub cuda: i64,

    /// Environment steps sampled per iteration
    #[arg(long = "max_steps_per_iter", default_value_t = 10_000)]
    pub max_steps_per_iter: usize,

    /// Mini-batch size of an update
    #[arg(long = "batch_size", default_value_t = 256)]
    pub batch_size: usize,

    /// Action samples per observation in the policy loss
    #[arg(long, default_value_t = 1)]
    pub sampling: usize,

    /// Use the likelihood-ratio gradient instead of reparameterization
    #[arg(long = "no_reparam", default_value_t = false)]
    pub no_reparam: bool,

    /// Learning rate of the policy and the entropy coefficient
    #[arg(long = "pol_lr", default_value_t = 1e-4)]
    pub pol_lr: f64,

    /// Learning rate of the Q functions
    #[arg(long = "qf_lr", default_value_t = 3e-4)]
    pub qf_lr: f64,

    /// Initial entropy coefficient
    #[arg(long = "ent_alpha", default_value_t = 1.0)]
    pub ent_alpha: f64,

    /// Keep the entropy coefficient fixed at ent_alpha
    #[arg(long = "fix_alpha", default_value_t = false)]
    pub fix_alpha: bool,

    /// Rate of the soft update of the target Q functions
    #[arg(long, default_value_t = 5e-3)]
    pub tau: f64,

    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    pub gamma: f64,

    /// The maximum number of transitions in the replay pool
    #[arg(long = "buffer_capacity", default_value_t = 1_000_000)]
    pub buffer_capacity: usize,

    /// Units of the hidden layers of the networks
    #[arg(long, value_delimiter = ',', default_value = "256,256")]
    pub hidden: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["keel-sac"]);
        assert_eq!(args.log, "garbage");
        assert_eq!(args.env_name, "Pendulum-v0");
        assert!(!args.record);
        assert_eq!(args.seed, 256);
        assert_eq!(args.max_episodes, 1_000_000);
        assert_eq!(args.num_parallel, 4);
        assert_eq!(args.cuda, -1);
        assert_eq!(args.max_steps_per_iter, 10_000);
        assert_eq!(args.batch_size, 256);
        assert_eq!(args.sampling, 1);
        assert!(!args.no_reparam);
        assert_eq!(args.pol_lr, 1e-4);
        assert_eq!(args.qf_lr, 3e-4);
        assert_eq!(args.ent_alpha, 1.0);
        assert!(!args.fix_alpha);
        assert_eq!(args.tau, 5e-3);
        assert_eq!(args.gamma, 0.99);
        assert_eq!(args.buffer_capacity, 1_000_000);
        assert_eq!(args.hidden, vec![256, 256]);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "keel-sac",
            "--env_name",
            "MountainCarContinuous-v0",
            "--cuda",
            "0",
            "--no_reparam",
            "--hidden",
            "64,32,16",
            "--record",
        ]);
        assert_eq!(args.env_name, "MountainCarContinuous-v0");
        assert_eq!(args.cuda, 0);
        assert!(args.no_reparam);
        assert!(args.record);
        assert_eq!(args.hidden, vec![64, 32, 16]);

        let args = Args::parse_from(["keel-sac", "--cuda", "-1"]);
        assert_eq!(args.cuda, -1);
    }

    #[test]
    fn test_serialize() -> anyhow::Result<()> {
        let args = Args::parse_from(["keel-sac", "--seed", "3"]);
        let json: serde_json::Value = serde_json::to_value(&args)?;
        assert_eq!(json["seed"], 3);
        assert_eq!(json["env_name"], "Pendulum-v0");
        Ok(())
    }
}
