//! Action of [`GymEnv`](crate::GymEnv).
use keel_core::Act;

/// Action as a flat vector with elements in `[-1, 1]`.
///
/// [`GymEnv`](crate::GymEnv) rescales the elements onto its action space.
#[derive(Clone, Debug, PartialEq)]
pub struct GymAct(pub Vec<f32>);

impl Act for GymAct {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f32>> for GymAct {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}
