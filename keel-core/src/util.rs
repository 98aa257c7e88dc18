//! Utilities.
use anyhow::Result;
use log::info;
use std::time::{Duration, Instant};

/// Runs `f` and returns its value with the elapsed wall-clock time.
///
/// The elapsed time is logged at info level with `name`.
pub fn measure<T, F>(name: &str, f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let value = f()?;
    let elapsed = start.elapsed();
    info!("[{}]: {:.3}s", name, elapsed.as_secs_f32());
    Ok((value, elapsed))
}

/// Returns `true` for episode ids that are recorded.
///
/// Those are the perfect cubes below 1000 and the multiples of 1000 from there on.
pub fn capped_cubic_schedule(episode_id: usize) -> bool {
    if episode_id < 1000 {
        let c = (episode_id as f64).cbrt().round() as usize;
        c * c * c == episode_id
    } else {
        episode_id % 1000 == 0
    }
}
