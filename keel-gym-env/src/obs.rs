//! Observation of [`GymEnv`](crate::GymEnv).
use keel_core::Obs;

/// Observation as a flat vector.
#[derive(Clone, Debug, PartialEq)]
pub struct GymObs(pub Vec<f32>);

impl Obs for GymObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f32>> for GymObs {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}
