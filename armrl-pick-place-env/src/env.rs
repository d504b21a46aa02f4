//! Pick-and-place environment.
mod config;
use crate::{
    decoder::ActionDecoder,
    episode::{ArmPhase, TaskEpisode},
    grasp::GraspTransition,
    obs::ObsLayout,
    world::World,
    PickPlaceAct, PickPlaceObs,
};
use anyhow::Result;
use armrl_core::{
    record::{Record, RecordValue},
    Env, Info, Step,
};
pub use config::PickPlaceEnvConfig;
use log::{info, trace};
use rand::{rngs::StdRng, SeedableRng};

/// Information in [`Step`] emitted by [`PickPlaceEnv`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickPlaceInfo {
    /// Phase after the step.
    pub phase: ArmPhase,

    /// Grasp transition caused by the step.
    pub transition: GraspTransition,

    /// `true` if the block is held after the step.
    pub holding: bool,
}

impl Info for PickPlaceInfo {}

/// A robotic arm picking a block and placing it in a target zone.
///
/// Wires a [`TaskEpisode`] to its [`World`] behind the [`Env`] interface.
/// Episodes end with termination when the block is placed, or with
/// truncation after [`PickPlaceEnvConfig::max_steps`] steps.
///
/// The step [`Record`] carries the reward terms of the step, the distances
/// after it and `"truncated"`.
pub struct PickPlaceEnv {
    episode: TaskEpisode,
    world: World,
    decoder: ActionDecoder,
    layout: ObsLayout,
    rng: StdRng,
    seed: i64,
    max_steps: Option<usize>,
    count_steps: usize,
    pending_grip: bool,
}

impl PickPlaceEnv {
    /// Requests a grip toggle in the next step.
    ///
    /// Continuous actions have no grip channel, so a manual grip key is fed in here.
    pub fn request_grip(&mut self) {
        self.pending_grip = true;
    }

    /// The current episode.
    pub fn episode(&self) -> &TaskEpisode {
        &self.episode
    }

    /// The scene.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The action decoder.
    pub fn decoder(&self) -> &ActionDecoder {
        &self.decoder
    }

    /// Observation of the current state.
    pub fn observe(&self) -> PickPlaceObs {
        self.layout.observe(&self.episode, &self.world)
    }

    /// The number of steps in the current episode.
    pub fn count_steps(&self) -> usize {
        self.count_steps
    }

    fn reset_episode(&mut self) -> PickPlaceObs {
        self.episode.reset(&mut self.world, &mut self.rng);
        self.count_steps = 0;
        self.pending_grip = false;
        self.observe()
    }
}

impl Env for PickPlaceEnv {
    type Config = PickPlaceEnvConfig;
    type Obs = PickPlaceObs;
    type Act = PickPlaceAct;
    type Info = PickPlaceInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        config.validate()?;

        let mut env = Self {
            episode: TaskEpisode::new(&config.joints, &config.task),
            world: World::build(&config.world),
            decoder: ActionDecoder::new(&config.action),
            layout: config.obs_layout.clone(),
            rng: StdRng::seed_from_u64(seed as u64),
            seed,
            max_steps: config.max_steps,
            count_steps: 0,
            pending_grip: false,
        };
        env.reset_episode();

        info!(
            "Built pick-and-place env: {} joints, {:?} actions, obs dim {}",
            config.joints.len(),
            env.decoder.encoding(),
            env.layout.dim(config.joints.len())
        );

        Ok(env)
    }

    /// Resets the environment if `is_done[0] == 1` or `is_done.is_none()`.
    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<PickPlaceObs> {
        match is_done {
            Some(v) if v.first() != Some(&1) => Ok(self.observe()),
            _ => Ok(self.reset_episode()),
        }
    }

    /// Reseeds the random number generator with `seed + ix` and resets.
    fn reset_with_index(&mut self, ix: usize) -> Result<PickPlaceObs> {
        self.rng = StdRng::seed_from_u64((self.seed as u64).wrapping_add(ix as u64));
        Ok(self.reset_episode())
    }

    fn step(&mut self, act: &PickPlaceAct) -> (Step<Self>, Record)
    where
        Self: Sized,
    {
        let mut decoded = self.decoder.decode(act);
        decoded.grip_toggle |= std::mem::take(&mut self.pending_grip);

        let outcome = self.episode.step(&mut self.world, &decoded);
        self.count_steps += 1;

        let is_truncated = !outcome.terminated
            && self.max_steps.map_or(false, |m| self.count_steps >= m);
        if is_truncated {
            trace!("Truncated after {} steps", self.count_steps);
        }

        let info = PickPlaceInfo {
            phase: self.episode.phase(),
            transition: outcome.transition,
            holding: self.episode.is_holding(),
        };
        let mut record = outcome.record;
        record.insert("truncated", RecordValue::Scalar(is_truncated as i32 as f32));

        let step = Step::new(
            self.observe(),
            act.clone(),
            vec![outcome.reward],
            vec![outcome.terminated as i8],
            vec![is_truncated as i8],
            info,
        );

        (step, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PickPlaceError;
    use armrl_core::Obs;

    #[test]
    fn build_rejects_invalid_config() {
        let config = PickPlaceEnvConfig::default().joints(vec![]);
        let err = PickPlaceEnv::build(&config, 0).err().unwrap();
        assert_eq!(
            err.downcast_ref::<PickPlaceError>(),
            Some(&PickPlaceError::NoJoints)
        );
    }

    #[test]
    fn observation_dimension_matches_layout() {
        let config = PickPlaceEnvConfig::discrete_grip();
        let mut env = PickPlaceEnv::build(&config, 0).unwrap();
        let obs = env.reset(None).unwrap();
        assert_eq!(obs.len(), config.obs_layout.dim(2));

        let (step, _) = env.step(&PickPlaceAct::idle_discrete(2));
        assert_eq!(step.obs.len(), obs.len());
    }

    #[test]
    fn reset_only_when_done() {
        let mut env = PickPlaceEnv::build(&PickPlaceEnvConfig::default(), 0).unwrap();
        env.reset(None).unwrap();
        env.step(&PickPlaceAct::Continuous(vec![1.0, 0.0]));
        let obs = env.observe();

        assert_eq!(env.reset(Some(&vec![0])).unwrap(), obs);
        assert_eq!(env.count_steps(), 1);
        env.reset(Some(&vec![1])).unwrap();
        assert_eq!(env.count_steps(), 0);
    }

    #[test]
    fn step_ceiling_truncates() {
        let config = PickPlaceEnvConfig::default().max_steps(Some(3));
        let mut env = PickPlaceEnv::build(&config, 0).unwrap();
        env.reset(None).unwrap();

        let act = PickPlaceAct::idle_continuous(2);
        for _ in 0..2 {
            let (step, record) = env.step(&act);
            assert!(!step.is_done());
            assert_eq!(record.get_scalar("truncated").unwrap(), 0.0);
        }
        let (step, record) = env.step(&act);
        assert!(step.is_done());
        assert!(!step.is_terminated());
        assert_eq!(record.get_scalar("truncated").unwrap(), 1.0);
    }

    #[test]
    fn reset_with_index_is_deterministic() {
        let config = PickPlaceEnvConfig::discrete_grip();
        let mut env1 = PickPlaceEnv::build(&config, 7).unwrap();
        let mut env2 = PickPlaceEnv::build(&config, 7).unwrap();

        env2.reset(None).unwrap();
        assert_eq!(
            env1.reset_with_index(3).unwrap(),
            env2.reset_with_index(3).unwrap()
        );
        assert_ne!(
            env1.reset_with_index(3).unwrap(),
            env1.reset_with_index(4).unwrap()
        );
    }

    #[test]
    fn requested_grip_is_consumed_by_one_step() {
        let mut env = PickPlaceEnv::build(&PickPlaceEnvConfig::default(), 0).unwrap();
        env.reset(None).unwrap();
        env.request_grip();
        env.step(&PickPlaceAct::idle_continuous(2));
        assert!(!env.pending_grip);
    }
}
