//! This module is used for tests.
use crate::{record::Record, Act, Env, Obs, Policy, Step};

#[derive(Clone, Debug)]
/// Number of steps taken in the current episode.
pub struct CountdownObs(pub usize);

impl Obs for CountdownObs {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug)]
/// An action doing nothing.
pub struct CountdownAct;

impl Act for CountdownAct {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug)]
pub struct CountdownConfig {
    pub terminate_after: usize,
    pub max_steps: Option<usize>,
}

/// Gives reward 1 per step and terminates after a fixed number of steps.
pub struct CountdownEnv {
    config: CountdownConfig,
    count: usize,
    pub n_resets: usize,
}

impl Env for CountdownEnv {
    type Config = CountdownConfig;
    type Obs = CountdownObs;
    type Act = CountdownAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> anyhow::Result<Self> {
        Ok(Self {
            config: config.clone(),
            count: 0,
            n_resets: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        self.count += 1;
        let terminated = self.count >= self.config.terminate_after;
        let truncated = !terminated
            && self
                .config
                .max_steps
                .map_or(false, |max_steps| self.count >= max_steps);
        let step = Step::new(
            CountdownObs(self.count),
            a.clone(),
            vec![1.0],
            vec![terminated as i8],
            vec![truncated as i8],
            (),
        );
        (step, Record::empty())
    }

    fn reset(&mut self, _is_done: Option<&Vec<i8>>) -> anyhow::Result<Self::Obs> {
        self.count = 0;
        self.n_resets += 1;
        Ok(CountdownObs(0))
    }

    fn reset_with_index(&mut self, _ix: usize) -> anyhow::Result<Self::Obs> {
        self.reset(None)
    }
}

/// Always returns [`CountdownAct`].
pub struct IdlePolicy;

impl Policy<CountdownEnv> for IdlePolicy {
    fn sample(&mut self, _obs: &CountdownObs) -> CountdownAct {
        CountdownAct
    }
}
