//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// Runs a fixed number of episodes and reports averages over them.
///
/// The returned [`Record`] has three scalars:
///
/// * `"Episode return"` - the average cumulative reward,
/// * `"Episode length"` - the average number of steps,
/// * `"Success rate"` - the fraction of episodes that ended with termination
///   rather than truncation.
///
/// Episodes only end when the environment reports termination or truncation,
/// so the environment must carry a step ceiling if the policy may never succeed.
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut r_total = 0f32;
        let mut steps_total = 0usize;
        let mut n_success = 0usize;

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut r_episode = 0f32;

            loop {
                let act = policy.sample(&prev_obs);
                let (step, _) = self.env.step(&act);
                r_episode += step.reward[0];
                steps_total += 1;
                if step.is_done() {
                    if step.is_terminated() {
                        n_success += 1;
                    }
                    break;
                }
                prev_obs = step.obs;
            }

            info!("Evaluation episode {}: return = {}", ix, r_episode);
            r_total += r_episode;
        }

        let n = self.n_episodes.max(1) as f32;
        Ok(Record::from_slice(&[
            ("Episode return", RecordValue::Scalar(r_total / n)),
            ("Episode length", RecordValue::Scalar(steps_total as f32 / n)),
            ("Success rate", RecordValue::Scalar(n_success as f32 / n)),
        ]))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}
