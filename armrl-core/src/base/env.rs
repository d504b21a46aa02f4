//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// The learner drives an environment with three calls: [`Env::reset`] at the
/// beginning of every episode, [`Env::step`] once per simulation tick, and
/// reads episode termination and reward off the returned [`Step`].
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Resets the environment if `is_done[0] == 1` or `is_done.is_none()`.
    ///
    /// `is_done.len()` is expected to be 1.
    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<Self::Obs>;

    /// Performes an environment step and resets the environment if the episode ends.
    ///
    /// The observation after the reset is stored in [`Step::init_obs`].
    fn step_with_reset(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized,
    {
        let (step, record) = self.step(a);
        if step.is_done() {
            match self.reset(None) {
                Ok(init_obs) => (step.with_init_obs(init_obs), record),
                Err(e) => {
                    log::warn!("Failed to reset the environment: {}", e);
                    (step, record)
                }
            }
        } else {
            (step, record)
        }
    }

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way. For example, it can be used as a random seed,
    /// which is useful when evaluating a trained agent. This method is called
    /// in [`DefaultEvaluator`](crate::DefaultEvaluator).
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;
}
