//! Utilities for interaction of policies and environments.
use crate::{
    record::{RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;

/// Run episodes with a policy and recorder, returning the return of every episode.
///
/// The record of every step is extended with `"reward"`, `"episode"` and
/// `"step"` before being written to `recorder`.
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    let mut rs = Vec::new();

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset(None)?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_obs);
            let (step, mut record) = env.step(&act);
            r_total += step.reward[0];

            record.insert("reward", RecordValue::Scalar(step.reward[0]));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            recorder.write(record);

            if step.is_done() {
                break;
            }
            prev_obs = step.obs;
            count_step += 1;
        }
        rs.push(r_total);
    }

    Ok(rs)
}
