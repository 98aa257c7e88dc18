//! Soft actor-critic training on Gym-style environments.
//!
//! The workspace consists of the following crates:
//!
//! * `keel-core` provides the environment and agent traits, the transition pool
//!   [`Traj`], the multi-threaded episode sampler [`EpiSampler`], the CSV recorder
//!   and the [`Trainer`].
//! * `keel-candle-agent` implements the SAC agent with
//!   [candle](https://crates.io/crates/candle-core).
//! * `keel-gym-env` has classic control environments simulated in Rust.
//! * `keel` is the command-line driver `keel-sac`, wired up in [`run`].
//!
//! A run writes the following files under the log directory:
//!
//! * `args.json`: the arguments,
//! * `trainer.yaml` and `sac.yaml`: the configurations,
//! * `progress.csv`: a row per iteration with losses, returns, counters and timings,
//! * `models/<name>_<tag>.safetensors`: checkpoints with tags `last` and `max`.
mod args;
pub use args::Args;

use anyhow::Result;
use keel_candle_agent::{
    mlp::{Mlp, Mlp2, MlpConfig},
    opt::OptimizerConfig,
    sac::{ActorConfig, CriticConfig, EntCoefMode, Sac, SacConfig},
    Device, TensorBatch,
};
use keel_core::{
    record::CsvRecorder,
    sampler::{EpiSampler, EpiSamplerConfig},
    traj::{Traj, TrajConfig},
    Env as _, ReplayBufferBase as _, TrainStats, Trainer, TrainerConfig,
};
use keel_gym_env::{GymEnv, GymEnvConfig};
use log::info;
use std::{fs, path::Path};

type Env = GymEnv;
type OffTraj = Traj<TensorBatch, TensorBatch>;
type Agent = Sac<Env, Mlp, Mlp2, OffTraj>;

fn env_config(args: &Args, log_dir: &Path) -> GymEnvConfig {
    let record_dir = match args.record {
        true => Some(log_dir.join("episodes").to_string_lossy().into_owned()),
        false => None,
    };
    GymEnvConfig::default()
        .name(args.env_name.as_str())
        .record_dir(record_dir)
}

fn sac_config(args: &Args, obs_dim: usize, act_dim: usize) -> SacConfig<MlpConfig, MlpConfig> {
    let actor_config = ActorConfig::default()
        .pi_config(MlpConfig::new(obs_dim, args.hidden.clone(), act_dim, false))
        .opt_config(OptimizerConfig::default().learning_rate(args.pol_lr));
    let critic_config = CriticConfig::default()
        .q_config(MlpConfig::new(obs_dim + act_dim, args.hidden.clone(), 1, false))
        .opt_config(OptimizerConfig::default().learning_rate(args.qf_lr));
    let ent_coef_mode = match args.fix_alpha {
        true => EntCoefMode::Fix(args.ent_alpha),
        false => EntCoefMode::Auto {
            init_alpha: args.ent_alpha,
            target_entropy: -(act_dim as f64),
            lr: args.pol_lr,
        },
    };

    SacConfig::default()
        .actor_config(actor_config)
        .critic_config(critic_config)
        .discount_factor(args.gamma)
        .tau(args.tau)
        .ent_coef_mode(ent_coef_mode)
        .batch_size(args.batch_size)
        .sampling(args.sampling)
        .reparam(!args.no_reparam)
        .device(Device::from_cuda_index(args.cuda))
}

/// Trains a SAC agent as specified by `args`.
pub fn run(args: &Args) -> Result<TrainStats> {
    let log_dir = Path::new(&args.log);
    let model_dir = log_dir.join("models");
    fs::create_dir_all(&model_dir)?;

    let args_json = serde_json::to_string_pretty(args)?;
    fs::write(log_dir.join("args.json"), &args_json)?;
    info!("Args:\n{}", args_json);

    let env_config = env_config(args, log_dir);
    let (obs_dim, act_dim) = {
        let env = Env::build(&env_config, args.seed)?;
        (env.observation_space().dim(), env.action_space().dim())
    };
    info!(
        "{}: observation dim {}, action dim {}",
        args.env_name, obs_dim, act_dim
    );

    let sac_config = sac_config(args, obs_dim, act_dim);
    sac_config.save(log_dir.join("sac.yaml"))?;
    let mut agent = Agent::build(sac_config)?;

    let sampler_config = EpiSamplerConfig::default()
        .num_parallel(args.num_parallel)
        .seed(args.seed);
    let mut sampler = EpiSampler::<Env>::build(&env_config, &sampler_config)?;
    let mut off_traj = OffTraj::build(
        &TrajConfig::default()
            .capacity(args.buffer_capacity)
            .seed(args.seed as u64),
    );
    let mut recorder = CsvRecorder::new(log_dir.join("progress.csv"))?;

    let trainer_config = TrainerConfig::default()
        .max_episodes(args.max_episodes)
        .max_steps_per_iter(args.max_steps_per_iter)
        .model_dir(model_dir.to_string_lossy());
    trainer_config.save(log_dir.join("trainer.yaml"))?;
    let mut trainer = Trainer::build(trainer_config);

    let stats = trainer.train(&mut agent, &mut sampler, &mut off_traj, &mut recorder)?;
    info!(
        "Finished: {} episodes, {} steps, best mean return {}",
        stats.total_epi, stats.total_step, stats.max_reward
    );
    Ok(stats)
}
