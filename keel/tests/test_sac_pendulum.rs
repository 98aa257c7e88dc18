use anyhow::Result;
use clap::Parser;
use keel::{run, Args};
use std::fs;
use tempdir::TempDir;

const CHECKPOINTS: [&str; 10] = [
    "pol",
    "qf1",
    "qf2",
    "targ_qf1",
    "targ_qf2",
    "optim_pol",
    "optim_qf1",
    "optim_qf2",
    "log_alpha",
    "optim_alpha",
];

fn args(log: &str, extra: &[&str]) -> Args {
    let mut argv = vec![
        "keel-sac",
        "--log",
        log,
        "--max_episodes",
        "2",
        "--max_steps_per_iter",
        "200",
        "--num_parallel",
        "2",
        "--batch_size",
        "32",
        "--hidden",
        "16,16",
    ];
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

#[test]
fn test_sac_pendulum() -> Result<()> {
    let dir = TempDir::new("sac_pendulum")?;
    let log = dir.path().join("log");
    let log = log.to_string_lossy();
    let stats = run(&args(&log, &["--record"]))?;
    assert!(stats.total_epi >= 2);
    assert_eq!(stats.total_step, 200 * stats.total_epi);

    let log_dir = dir.path().join("log");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(log_dir.join("args.json"))?)?;
    assert_eq!(json["env_name"], "Pendulum-v0");
    assert_eq!(json["max_episodes"], 2);
    assert!(log_dir.join("trainer.yaml").exists());
    assert!(log_dir.join("sac.yaml").exists());

    let mut rdr = csv::Reader::from_path(log_dir.join("progress.csv"))?;
    let header = rdr.headers()?.clone();
    for key in ["PolLossAverage", "QfLossAverage", "AlphaAverage", "RewardAverage"] {
        assert!(header.iter().any(|h| h == key), "{}", key);
    }
    assert_eq!(rdr.records().count(), stats.n_iters);

    for tag in ["last", "max"] {
        for name in CHECKPOINTS {
            let path = log_dir
                .join("models")
                .join(format!("{}_{}.safetensors", name, tag));
            assert!(path.exists(), "{:?}", path);
        }
    }

    // The first episode of a worker is recorded
    let episodes = log_dir.join("episodes");
    assert!(
        episodes.join("episode_000000_seed256.csv").exists()
            || episodes.join("episode_000000_seed257.csv").exists()
    );
    Ok(())
}

#[test]
fn test_fixed_alpha_likelihood_ratio() -> Result<()> {
    let dir = TempDir::new("sac_pendulum")?;
    let log = dir.path().join("log");
    let log = log.to_string_lossy();
    let extra = ["--fix_alpha", "--no_reparam", "--sampling", "2"];
    let stats = run(&args(&log, &extra))?;
    assert!(stats.n_iters >= 1);

    let models = dir.path().join("log").join("models");
    assert!(models.join("log_alpha_last.safetensors").exists());
    assert!(!models.join("optim_alpha_last.safetensors").exists());

    let mut rdr = csv::Reader::from_path(dir.path().join("log").join("progress.csv"))?;
    let header = rdr.headers()?.clone();
    let ix = header
        .iter()
        .position(|h| h == "AlphaAverage")
        .expect("AlphaAverage column");
    for row in rdr.records() {
        let alpha: f32 = row?[ix].parse()?;
        assert!((alpha - 1.0).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_unknown_env_is_error() -> Result<()> {
    let dir = TempDir::new("sac_pendulum")?;
    let log = dir.path().join("log");
    let log = log.to_string_lossy();
    assert!(run(&args(&log, &["--env_name", "Humanoid-v4"])).is_err());
    Ok(())
}
