//! Episode lifecycle and reward of the pick-and-place task.
mod config;
use crate::{
    decoder::DecodedAction,
    grasp::{GraspController, GraspTransition},
    proximity::ProximityDetector,
    rig::{JointConfig, JointRig},
    world::World,
};
use armrl_core::record::{Record, RecordValue};
pub use config::{BonusPolicy, RewardConfig, TaskConfig};
use log::{info, trace};
use rand::Rng;

/// Whether an episode is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// Steps are simulated and rewarded.
    Running,

    /// The block was placed; steps are ignored until the next reset.
    Terminated,
}

/// Phase of the task, derived from the grasp state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmPhase {
    /// Moving towards the block.
    Approaching,

    /// Carrying the block to the target zone.
    Transporting,
}

/// Result of [`TaskEpisode::step`].
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Reward of the step.
    pub reward: f32,

    /// `true` if the episode is terminated after the step.
    pub terminated: bool,

    /// Grasp transition caused by the step.
    pub transition: GraspTransition,

    /// Reward terms and distances.
    pub record: Record,
}

#[derive(Debug, Clone, Default)]
struct Latches {
    near_block: bool,
    approach_paid: bool,
    // Set by a grasp, cleared once the block is free and out of the trigger.
    grasp_spent: bool,
    grasp_paid: bool,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// One trial of the pick-and-place task.
///
/// The episode owns the joint state of the arm, the gripper and the proximity
/// flag. Bodies belong to the [`World`], which is passed to every call.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Approaching: reset
///     Approaching --> Transporting: grasp
///     Transporting --> Approaching: release
///     Approaching --> Terminated: block released in target zone
///     Terminated --> Approaching: reset
/// ```
///
/// A step runs as follows:
///
/// 1. Joint controls are applied to the rig.
/// 2. The world is synced to the new pose and overlap events update the proximity flag.
/// 3. The gripper toggles if the action asks for it, or if an automatic grasp
///    or release condition of [`TaskConfig`] is met. At most one toggle happens per step.
/// 4. The reward is the sum of
///    * the shaping term, `-approach_coef × d(end-effector, block)` while not
///      holding and `-transport_coef × d(block, target)` while holding,
///    * the approach bonus, when not holding and `d(end-effector, block) < approach_threshold`,
///    * the grasp bonus, on a grasp,
///    * `-time_penalty`.
/// 5. If the block is not held and `d(block, target) < place_threshold`, the
///    placement bonus is added and the episode terminates.
///
/// The approach and grasp bonuses are paid according to [`BonusPolicy`].
/// Under [`BonusPolicy::OncePerCrossing`], a grasp bonus is paid again only
/// after the block has been released and has left the gripper trigger, and an
/// approach bonus only after the end-effector has moved away from the block.
pub struct TaskEpisode {
    config: TaskConfig,
    rig: JointRig,
    grasp: GraspController,
    proximity: ProximityDetector,
    status: EpisodeStatus,
    holding: bool,
    latches: Latches,
    steps: usize,
}

impl TaskEpisode {
    /// Creates an episode. It has to be [reset](TaskEpisode::reset) before the first step.
    pub fn new(joints: &[JointConfig], config: &TaskConfig) -> Self {
        Self {
            config: config.clone(),
            rig: JointRig::new(joints),
            grasp: GraspController::new(),
            proximity: ProximityDetector::new(),
            status: EpisodeStatus::Running,
            holding: false,
            latches: Latches::default(),
            steps: 0,
        }
    }

    /// Starts a new episode.
    ///
    /// Releases anything held, resets the pose, respawns the block and
    /// rebuilds the proximity flag from scratch.
    pub fn reset<R: Rng + ?Sized>(&mut self, world: &mut World, rng: &mut R) {
        self.grasp.force_release(world);

        if self.config.randomize_pose {
            self.rig.reset_randomized(rng);
        } else {
            self.rig.reset_initial();
        }

        let position =
            world.spawn_zone().anchor + self.config.spawn_offset + self.config.spawn.sample(rng);
        world.place_block(position);

        self.proximity.clear();
        world.clear_overlaps();
        for event in world.sync(&self.rig) {
            self.proximity.handle(event);
        }

        self.holding = false;
        self.latches = Latches::default();
        self.status = EpisodeStatus::Running;
        self.steps = 0;
        trace!("Reset: pose {:?}, block at {:?}", self.rig.angles(), position);
    }

    /// Advances the episode by one step.
    ///
    /// A terminated episode ignores the action and returns zero reward.
    pub fn step(&mut self, world: &mut World, action: &DecodedAction) -> StepOutcome {
        if self.status == EpisodeStatus::Terminated {
            return StepOutcome {
                reward: 0.0,
                terminated: true,
                transition: GraspTransition::Ignored,
                record: Record::empty(),
            };
        }
        self.steps += 1;

        for &(joint, input) in action.controls.iter() {
            self.rig.apply_control(joint, input, self.config.dt);
        }
        for event in world.sync(&self.rig) {
            self.proximity.handle(event);
        }

        let transition = if action.grip_toggle || self.automatic_toggle(world) {
            let end_effector = world.end_effector();
            self.grasp.toggle(&self.proximity, world, &end_effector)
        } else {
            GraspTransition::Ignored
        };
        self.holding = self.grasp.is_holding();

        let reward_config = &self.config.reward;
        let distance_to_block = world.distance_to_block();
        let distance_to_zone = world.block_to_target();

        let shaping = if self.holding {
            -reward_config.transport_coef * distance_to_zone
        } else {
            -reward_config.approach_coef * distance_to_block
        };

        // A held block stays at the end-effector, so holding keeps the crossing latched.
        let near_block = distance_to_block < reward_config.approach_threshold;
        let approach_bonus = if !self.holding
            && pays(
                reward_config.bonus_policy,
                near_block,
                self.latches.near_block,
                &mut self.latches.approach_paid,
            ) {
            reward_config.approach_bonus
        } else {
            0.0
        };
        self.latches.near_block = near_block;

        let grasped = matches!(transition, GraspTransition::Grasped(_));
        let grasp_bonus = if pays(
            reward_config.bonus_policy,
            grasped,
            self.latches.grasp_spent,
            &mut self.latches.grasp_paid,
        ) {
            reward_config.grasp_bonus
        } else {
            0.0
        };
        if grasped {
            self.latches.grasp_spent = true;
        } else if !self.holding && !self.proximity.is_touching() {
            self.latches.grasp_spent = false;
        }

        let time_penalty = -reward_config.time_penalty;

        let placement_bonus = if !self.holding && distance_to_zone < reward_config.place_threshold {
            self.status = EpisodeStatus::Terminated;
            info!(
                "Block placed after {} steps, {} from the target",
                self.steps, distance_to_zone
            );
            reward_config.placement_bonus
        } else {
            0.0
        };

        let reward = shaping + approach_bonus + grasp_bonus + time_penalty + placement_bonus;
        trace!(
            "Step {}: reward {}, holding {}, {:?}",
            self.steps,
            reward,
            self.holding,
            transition
        );

        let record = Record::from_slice(&[
            ("shaping", RecordValue::Scalar(shaping)),
            ("approach_bonus", RecordValue::Scalar(approach_bonus)),
            ("grasp_bonus", RecordValue::Scalar(grasp_bonus)),
            ("time_penalty", RecordValue::Scalar(time_penalty)),
            ("placement_bonus", RecordValue::Scalar(placement_bonus)),
            ("distance_to_block", RecordValue::Scalar(distance_to_block)),
            ("distance_to_zone", RecordValue::Scalar(distance_to_zone)),
            ("holding", RecordValue::Scalar(self.holding as i32 as f32)),
        ]);

        StepOutcome {
            reward,
            terminated: self.status == EpisodeStatus::Terminated,
            transition,
            record,
        }
    }

    fn automatic_toggle(&self, world: &World) -> bool {
        if self.grasp.is_holding() {
            self.config.auto_release
                && world.block_to_target() < self.config.reward.place_threshold
        } else {
            match self.config.auto_grasp_distance {
                Some(d) => world.distance_to_block() < d,
                None => false,
            }
        }
    }

    /// Joint state of the arm.
    pub fn rig(&self) -> &JointRig {
        &self.rig
    }

    /// The gripper.
    pub fn grasp(&self) -> &GraspController {
        &self.grasp
    }

    /// The proximity flag.
    pub fn proximity(&self) -> &ProximityDetector {
        &self.proximity
    }

    /// Returns `true` if the block was held at the end of the last step.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Current phase.
    pub fn phase(&self) -> ArmPhase {
        if self.grasp.is_holding() {
            ArmPhase::Transporting
        } else {
            ArmPhase::Approaching
        }
    }

    /// Episode status.
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// Returns `true` if the episode is terminated.
    pub fn is_terminated(&self) -> bool {
        self.status == EpisodeStatus::Terminated
    }

    /// The number of steps since the last reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Configuration.
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }
}

// Decides whether a bonus whose condition is `now` (and was `before` on the
// previous step) is paid, updating the once-per-episode latch.
fn pays(policy: BonusPolicy, now: bool, before: bool, paid: &mut bool) -> bool {
    let pay = match policy {
        BonusPolicy::EveryStep => now,
        BonusPolicy::OncePerCrossing => now && !before,
        BonusPolicy::OncePerEpisode => now && !before && !*paid,
    };
    *paid |= pay;
    pay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rig::JointAxis,
        world::{SpawnRegion, WorldConfig, BLOCK},
    };
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use rand::{rngs::StdRng, SeedableRng};

    // Pitch at which the straight arm touches the floor-level block.
    const REACH_PITCH: f32 = 34.23;

    fn joints() -> Vec<JointConfig> {
        vec![
            JointConfig::new("base", JointAxis::Y, 60.0),
            JointConfig::new("elbow", JointAxis::X, 60.0),
        ]
    }

    fn task() -> TaskConfig {
        TaskConfig::default()
            .spawn(SpawnRegion::Disc { radius: 0.0 })
            .reward(RewardConfig::default().approach_bonus(0.5, 0.05))
    }

    fn setup(config: &TaskConfig) -> (TaskEpisode, World, StdRng) {
        let mut world = World::build(&WorldConfig::default());
        let mut episode = TaskEpisode::new(&joints(), config);
        let mut rng = StdRng::seed_from_u64(0);
        episode.reset(&mut world, &mut rng);
        (episode, world, rng)
    }

    fn idle() -> DecodedAction {
        DecodedAction {
            controls: vec![],
            grip_toggle: false,
        }
    }

    fn grip() -> DecodedAction {
        DecodedAction {
            controls: vec![],
            grip_toggle: true,
        }
    }

    fn put_arm(episode: &mut TaskEpisode, base: f32, elbow: f32) {
        episode.rig.reset_pose(&[base, elbow]);
    }

    #[test]
    fn reset_spawns_block_at_anchor_plus_offset() {
        let (episode, world, _) = setup(&task());
        assert_eq!(world.block_position(), Vector3::new(0.0, 0.025, 0.33));
        assert_eq!(episode.status(), EpisodeStatus::Running);
        assert_eq!(episode.phase(), ArmPhase::Approaching);
        assert!(!episode.proximity().is_touching());
    }

    #[test]
    fn shaping_penalizes_distance_to_block() {
        let (mut episode, mut world, _) = setup(&task());
        let outcome = episode.step(&mut world, &idle());

        let d = world.distance_to_block();
        assert_relative_eq!(outcome.reward, -0.1 * d, epsilon = 1e-6);
        assert_eq!(outcome.record.get_scalar("distance_to_block").unwrap(), d);
        assert!(!outcome.terminated);
    }

    #[test]
    fn grip_without_touch_is_ignored() {
        let (mut episode, mut world, _) = setup(&task());
        let outcome = episode.step(&mut world, &grip());
        assert_eq!(outcome.transition, GraspTransition::Ignored);
        assert!(!episode.is_holding());
    }

    #[test]
    fn grasp_pays_bonus_and_switches_to_transport() {
        let (mut episode, mut world, _) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);

        let outcome = episode.step(&mut world, &idle());
        assert!(episode.proximity().is_touching());
        assert_eq!(outcome.record.get_scalar("approach_bonus").unwrap(), 0.5);

        let outcome = episode.step(&mut world, &grip());
        assert_eq!(outcome.transition, GraspTransition::Grasped(BLOCK));
        assert_eq!(outcome.record.get_scalar("grasp_bonus").unwrap(), 1.0);
        assert_eq!(outcome.record.get_scalar("approach_bonus").unwrap(), 0.0);
        assert!(episode.is_holding());
        assert_eq!(episode.phase(), ArmPhase::Transporting);

        let d = world.block_to_target();
        assert_relative_eq!(
            outcome.record.get_scalar("shaping").unwrap(),
            -0.1 * d,
            epsilon = 1e-6
        );
    }

    #[test]
    fn approach_bonus_follows_policy() {
        for (policy, expected) in [
            (BonusPolicy::OncePerCrossing, vec![0.5, 0.0, 0.0, 0.5]),
            (BonusPolicy::OncePerEpisode, vec![0.5, 0.0, 0.0, 0.0]),
            (BonusPolicy::EveryStep, vec![0.5, 0.5, 0.0, 0.5]),
        ] {
            let config = task().reward(
                RewardConfig::default()
                    .approach_bonus(0.5, 0.05)
                    .bonus_policy(policy),
            );
            let (mut episode, mut world, _) = setup(&config);

            let mut paid = vec![];
            for elbow in [REACH_PITCH, REACH_PITCH, 0.0, REACH_PITCH] {
                put_arm(&mut episode, 0.0, elbow);
                let outcome = episode.step(&mut world, &idle());
                paid.push(outcome.record.get_scalar("approach_bonus").unwrap());
            }
            assert_eq!(paid, expected, "{:?}", policy);
        }
    }

    #[test]
    fn alternating_grips_pay_one_grasp_bonus() {
        let (mut episode, mut world, _) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);

        let outcome = episode.step(&mut world, &idle());
        let mut approach = outcome.record.get_scalar("approach_bonus").unwrap();
        let mut grasp = 0.0;
        let mut grasps = 0;
        for _ in 0..200 {
            let outcome = episode.step(&mut world, &grip());
            if matches!(outcome.transition, GraspTransition::Grasped(_)) {
                grasps += 1;
            }
            approach += outcome.record.get_scalar("approach_bonus").unwrap();
            grasp += outcome.record.get_scalar("grasp_bonus").unwrap();
            assert!(!outcome.terminated);
        }
        assert_eq!(grasps, 100);
        assert_eq!(grasp, 1.0);
        assert_eq!(approach, 0.5);
    }

    #[test]
    fn grasp_bonus_rearms_after_block_leaves_trigger() {
        let (mut episode, mut world, _) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);
        episode.step(&mut world, &grip());
        episode.step(&mut world, &grip());
        assert!(!episode.is_holding());

        put_arm(&mut episode, 0.0, 0.0);
        episode.step(&mut world, &idle());
        assert!(!episode.proximity().is_touching());

        put_arm(&mut episode, 0.0, REACH_PITCH);
        let outcome = episode.step(&mut world, &grip());
        assert_eq!(outcome.transition, GraspTransition::Grasped(BLOCK));
        assert_eq!(outcome.record.get_scalar("grasp_bonus").unwrap(), 1.0);
    }

    #[test]
    fn every_step_policy_pays_every_grasp() {
        let config = task().reward(RewardConfig::default().bonus_policy(BonusPolicy::EveryStep));
        let (mut episode, mut world, _) = setup(&config);
        put_arm(&mut episode, 0.0, REACH_PITCH);

        let paid: Vec<f32> = (0..4)
            .map(|_| {
                let outcome = episode.step(&mut world, &grip());
                outcome.record.get_scalar("grasp_bonus").unwrap()
            })
            .collect();
        assert_eq!(paid, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn no_termination_while_holding_in_zone() {
        let (mut episode, mut world, _) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);
        episode.step(&mut world, &grip());
        assert!(episode.is_holding());

        put_arm(&mut episode, 90.0, REACH_PITCH);
        let outcome = episode.step(&mut world, &idle());
        assert!(world.block_to_target() < 0.1);
        assert!(!outcome.terminated);
        assert_eq!(outcome.record.get_scalar("placement_bonus").unwrap(), 0.0);
    }

    #[test]
    fn release_in_zone_terminates_once() {
        let (mut episode, mut world, _) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);
        episode.step(&mut world, &grip());
        put_arm(&mut episode, 90.0, REACH_PITCH);
        episode.step(&mut world, &idle());

        let outcome = episode.step(&mut world, &grip());
        assert_eq!(outcome.transition, GraspTransition::Released(BLOCK));
        assert!(outcome.terminated);
        assert_eq!(outcome.record.get_scalar("placement_bonus").unwrap(), 3.0);
        assert_eq!(world.block_position().y, 0.025);

        let outcome = episode.step(&mut world, &grip());
        assert!(outcome.terminated);
        assert_eq!(outcome.reward, 0.0);
        assert_eq!(outcome.transition, GraspTransition::Ignored);
    }

    #[test]
    fn end_effector_near_block_does_not_terminate() {
        let config = task().reward(RewardConfig::default().placement_bonus(3.0, 0.01));
        let (mut episode, mut world, _) = setup(&config);
        put_arm(&mut episode, 0.0, REACH_PITCH);
        assert!(!episode.step(&mut world, &idle()).terminated);
    }

    #[test]
    fn automatic_grasp_and_release() {
        let config = task().auto_grasp_distance(Some(0.07)).auto_release(true);
        let (mut episode, mut world, _) = setup(&config);

        put_arm(&mut episode, 0.0, REACH_PITCH);
        let outcome = episode.step(&mut world, &idle());
        assert_eq!(outcome.transition, GraspTransition::Grasped(BLOCK));

        put_arm(&mut episode, 90.0, REACH_PITCH);
        let outcome = episode.step(&mut world, &idle());
        assert_eq!(outcome.transition, GraspTransition::Released(BLOCK));
        assert!(outcome.terminated);
    }

    #[test]
    fn grip_and_automatic_grasp_toggle_once() {
        let config = task().auto_grasp_distance(Some(0.07));
        let (mut episode, mut world, _) = setup(&config);
        put_arm(&mut episode, 0.0, REACH_PITCH);

        let outcome = episode.step(&mut world, &grip());
        assert_eq!(outcome.transition, GraspTransition::Grasped(BLOCK));
        assert!(episode.is_holding());
    }

    #[test]
    fn reset_releases_held_block() {
        let (mut episode, mut world, mut rng) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);
        episode.step(&mut world, &grip());
        assert!(episode.is_holding());

        episode.reset(&mut world, &mut rng);
        assert!(!episode.is_holding());
        assert!(!episode.grasp().is_holding());
        assert_eq!(episode.steps(), 0);
        assert!(!world.bodies().iter().any(|b| b.is_attached()));
    }

    #[test]
    fn time_penalty_is_subtracted() {
        let config = task().reward(
            RewardConfig::default()
                .approach_coef(0.0)
                .time_penalty(0.0005),
        );
        let (mut episode, mut world, _) = setup(&config);
        let outcome = episode.step(&mut world, &idle());
        assert_relative_eq!(outcome.reward, -0.0005);
    }

    #[test]
    fn removed_block_recovers_to_free() {
        let (mut episode, mut world, _) = setup(&task());
        put_arm(&mut episode, 0.0, REACH_PITCH);
        episode.step(&mut world, &grip());
        world.remove(BLOCK);

        let outcome = episode.step(&mut world, &grip());
        assert_eq!(outcome.transition, GraspTransition::Recovered);
        assert!(!episode.is_holding());
    }
}
