use super::ClassicControl;
use crate::BoxSpace;
use rand::{rngs::StdRng, Rng};
use std::f32::consts::PI;

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

/// Swing-up of an inverted pendulum.
///
/// The observation is `[cos(theta), sin(theta), theta_dot]` and the action is the
/// torque in `[-2, 2]`. The reward is `-(theta^2 + 0.1 * theta_dot^2 + 0.001 * u^2)`
/// with `theta` normalized to `[-pi, pi)`. Episodes never terminate.
#[derive(Debug, Default)]
pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
}

impl Pendulum {
    fn obs(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }
}

impl ClassicControl for Pendulum {
    fn observation_space(&self) -> BoxSpace {
        BoxSpace::new(vec![-1.0, -1.0, -MAX_SPEED], vec![1.0, 1.0, MAX_SPEED])
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::new(vec![-MAX_TORQUE], vec![MAX_TORQUE])
    }

    fn max_episode_steps(&self) -> usize {
        200
    }

    fn reset(&mut self, rng: &mut StdRng) -> Vec<f32> {
        self.theta = rng.gen_range(-PI..PI);
        self.theta_dot = rng.gen_range(-1.0..1.0);
        self.obs()
    }

    fn step(&mut self, act: &[f32]) -> (Vec<f32>, f32, bool) {
        let u = act[0].clamp(-MAX_TORQUE, MAX_TORQUE);
        let th = angle_normalize(self.theta);
        let cost = th * th + 0.1 * self.theta_dot * self.theta_dot + 0.001 * u * u;

        let theta_dot =
            self.theta_dot + (3.0 * G / (2.0 * L) * self.theta.sin() + 3.0 / (M * L * L) * u) * DT;
        self.theta_dot = theta_dot.clamp(-MAX_SPEED, MAX_SPEED);
        self.theta += self.theta_dot * DT;

        (self.obs(), -cost, false)
    }
}
