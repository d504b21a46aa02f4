//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Observations are fixed-size vectors from the point of view of a learner:
/// [`Obs::len`] must not change during an episode.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements in the observation.
    fn len(&self) -> usize;

    /// Returns `true` if the observation has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of channels in the action.
    fn len(&self) -> usize;

    /// Returns `true` if the action has no channels.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
