//! Stepping an environment with a policy across episode boundaries.
use crate::{
    record::{Record, RecordValue},
    Env, Policy, Step,
};
use anyhow::Result;
use log::info;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Drives an [`Env`] with a [`Policy`] one step at a time.
///
/// ```mermaid
/// graph LR
///     Env -->|Obs| Policy
///     Policy -->|Act| Env
///     Env -->|Record| Caller
/// ```
///
/// The environment is reset lazily before the first step and right after
/// every step that ends an episode, so the caller only ever calls
/// [`Rollout::step`]. When an episode ends, the returned [`Record`] carries
/// `"episode_return"` and `"episode_length"`.
pub struct Rollout<E: Env> {
    /// The environment being driven.
    env: E,

    /// Previous observation from the environment.
    prev_obs: Option<E::Obs>,

    /// The number of finished episodes.
    episodes: usize,

    /// Steps taken in the current episode.
    episode_steps: usize,

    /// Cumulative reward of the current episode.
    episode_return: f32,
}

impl<E: Env> Rollout<E> {
    /// Creates a new rollout over the given environment.
    pub fn new(env: E) -> Self {
        Self {
            env,
            prev_obs: None,
            episodes: 0,
            episode_steps: 0,
            episode_return: 0.0,
        }
    }

    /// Returns a reference to the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Returns a mutable reference to the environment.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Returns the number of finished episodes.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Samples an action from `policy` and applies it to the environment.
    pub fn step<P: Policy<E>>(&mut self, policy: &mut P) -> Result<(Step<E>, Record)> {
        let obs = match self.prev_obs.take() {
            Some(obs) => obs,
            None => self.env.reset(None)?,
        };

        let act = policy.sample(&obs);
        let (step, mut record) = self.env.step_with_reset(&act);
        self.episode_steps += 1;
        self.episode_return += step.reward[0];

        if step.is_done() {
            info!(
                "Episode {}: {} steps, return = {}",
                self.episodes, self.episode_steps, self.episode_return
            );
            record.insert("episode_return", RecordValue::Scalar(self.episode_return));
            record.insert(
                "episode_length",
                RecordValue::Scalar(self.episode_steps as f32),
            );
            self.episodes += 1;
            self.episode_steps = 0;
            self.episode_return = 0.0;
            self.prev_obs = step.init_obs.clone();
        } else {
            self.prev_obs = Some(step.obs.clone());
        }

        Ok((step, record))
    }
}
