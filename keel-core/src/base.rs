//! Core functionalities.
mod agent;
mod batch;
mod env;
mod episode;
mod policy;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use batch::TransitionBatch;
pub use env::Env;
pub use episode::Episode;
pub use policy::Policy;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::Step;

/// An observation of an environment.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements in the observation.
    fn len(&self) -> usize;
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of elements in the action.
    fn len(&self) -> usize;
}
