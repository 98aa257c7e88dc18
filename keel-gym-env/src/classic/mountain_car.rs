use super::ClassicControl;
use crate::BoxSpace;
use rand::{rngs::StdRng, Rng};

const MIN_POSITION: f32 = -1.2;
const MAX_POSITION: f32 = 0.6;
const MAX_SPEED: f32 = 0.07;
const GOAL_POSITION: f32 = 0.45;
const POWER: f32 = 0.0015;

/// A car in a valley that has to reach the top of the right hill.
///
/// The observation is `[position, velocity]` and the action is the force in
/// `[-1, 1]`. The episode terminates at the goal with reward `100`, and every
/// step costs `0.1 * force^2`.
#[derive(Debug)]
pub struct MountainCarContinuous {
    position: f32,
    velocity: f32,
}

impl Default for MountainCarContinuous {
    fn default() -> Self {
        Self {
            position: -0.5,
            velocity: 0.0,
        }
    }
}

impl ClassicControl for MountainCarContinuous {
    fn observation_space(&self) -> BoxSpace {
        BoxSpace::new(vec![MIN_POSITION, -MAX_SPEED], vec![MAX_POSITION, MAX_SPEED])
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::new(vec![-1.0], vec![1.0])
    }

    fn max_episode_steps(&self) -> usize {
        999
    }

    fn reset(&mut self, rng: &mut StdRng) -> Vec<f32> {
        self.position = rng.gen_range(-0.6..-0.4);
        self.velocity = 0.0;
        vec![self.position, self.velocity]
    }

    fn step(&mut self, act: &[f32]) -> (Vec<f32>, f32, bool) {
        let force = act[0].clamp(-1.0, 1.0);

        self.velocity += force * POWER - 0.0025 * (3.0 * self.position).cos();
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);
        self.position += self.velocity;
        self.position = self.position.clamp(MIN_POSITION, MAX_POSITION);
        if self.position == MIN_POSITION && self.velocity < 0.0 {
            self.velocity = 0.0;
        }

        let done = self.position >= GOAL_POSITION && self.velocity >= 0.0;
        let mut reward = -0.1 * force * force;
        if done {
            reward += 100.0;
        }

        (vec![self.position, self.velocity], reward, done)
    }
}
