//! Errors in this crate.
use thiserror::Error;

/// Errors in building and stepping [`GymEnv`](crate::GymEnv).
#[derive(Error, Debug, PartialEq)]
pub enum GymEnvError {
    /// No environment is registered with the name.
    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    /// The action does not match the action space.
    #[error("Action dimension mismatch: expected {expected}, got {got}")]
    ActDimMismatch {
        /// The dimension of the action space.
        expected: usize,

        /// The dimension of the given action.
        got: usize,
    },

    /// [`Env::step`](keel_core::Env::step) was called before a reset.
    #[error("Step before reset")]
    StepBeforeReset,
}
