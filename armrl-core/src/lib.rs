#![warn(missing_docs)]
//! Interfaces between learners and environments for armrl.
//!
//! This crate does not implement any learning algorithm. It defines the seam an
//! external learner talks through: an [`Env`] consumes an [`Act`] and emits a
//! [`Step`] holding the next [`Obs`], the reward and the episode flags, while a
//! [`Policy`] maps observations to actions. Metrics emitted along the way are
//! carried in [`record::Record`] objects.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod rollout;
pub use rollout::Rollout;

#[cfg(test)]
mod dummy;
