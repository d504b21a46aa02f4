//! Configuration of [`TaskEpisode`](super::TaskEpisode).
use crate::{
    error::{check_distance, PickPlaceError},
    world::SpawnRegion,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// How often a milestone bonus is paid while its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusPolicy {
    /// Paid on the step the condition becomes true.
    OncePerCrossing,

    /// Paid on the first crossing of an episode only.
    OncePerEpisode,

    /// Paid on every step the condition holds.
    EveryStep,
}

impl Default for BonusPolicy {
    fn default() -> Self {
        Self::OncePerCrossing
    }
}

/// Reward coefficients and thresholds.
///
/// Coefficients and penalties are magnitudes; they are subtracted from the reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Penalty per unit distance between the end-effector and the block, while not holding.
    pub approach_coef: f32,

    /// Penalty per unit distance between the block and the target zone, while holding.
    pub transport_coef: f32,

    /// Bonus for bringing the end-effector close to the block. Zero disables it.
    pub approach_bonus: f32,

    /// Distance below which the end-effector is close to the block.
    pub approach_threshold: f32,

    /// Bonus for grasping the block.
    pub grasp_bonus: f32,

    /// Bonus for releasing the block in the target zone. Ends the episode.
    pub placement_bonus: f32,

    /// Distance between the block and the target zone below which a released block is placed.
    pub place_threshold: f32,

    /// Penalty per step.
    pub time_penalty: f32,

    /// When the approach and grasp bonuses are paid.
    #[serde(default)]
    pub bonus_policy: BonusPolicy,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            approach_coef: 0.1,
            transport_coef: 0.1,
            approach_bonus: 0.0,
            approach_threshold: 0.05,
            grasp_bonus: 1.0,
            placement_bonus: 3.0,
            place_threshold: 0.1,
            time_penalty: 0.0,
            bonus_policy: BonusPolicy::default(),
        }
    }
}

impl RewardConfig {
    /// Sets the approach penalty coefficient.
    pub fn approach_coef(mut self, v: f32) -> Self {
        self.approach_coef = v;
        self
    }

    /// Sets the transport penalty coefficient.
    pub fn transport_coef(mut self, v: f32) -> Self {
        self.transport_coef = v;
        self
    }

    /// Sets the approach bonus and its distance threshold.
    pub fn approach_bonus(mut self, bonus: f32, threshold: f32) -> Self {
        self.approach_bonus = bonus;
        self.approach_threshold = threshold;
        self
    }

    /// Sets the grasp bonus.
    pub fn grasp_bonus(mut self, v: f32) -> Self {
        self.grasp_bonus = v;
        self
    }

    /// Sets the placement bonus and its distance threshold.
    pub fn placement_bonus(mut self, bonus: f32, threshold: f32) -> Self {
        self.placement_bonus = bonus;
        self.place_threshold = threshold;
        self
    }

    /// Sets the time penalty.
    pub fn time_penalty(mut self, v: f32) -> Self {
        self.time_penalty = v;
        self
    }

    /// Sets the bonus policy.
    pub fn bonus_policy(mut self, v: BonusPolicy) -> Self {
        self.bonus_policy = v;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PickPlaceError> {
        check_distance("approach_threshold", self.approach_threshold)?;
        check_distance("place_threshold", self.place_threshold)
    }
}

/// Configuration of [`TaskEpisode`](super::TaskEpisode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Simulation time step in seconds.
    pub dt: f32,

    /// Reward function.
    pub reward: RewardConfig,

    /// The gripper grasps by itself when the end-effector is closer to the block than this.
    pub auto_grasp_distance: Option<f32>,

    /// The gripper releases by itself when the held block is within the placement threshold.
    pub auto_release: bool,

    /// Sample the initial pose from the joints' reset ranges instead of using initial angles.
    pub randomize_pose: bool,

    /// Region around the spawn-zone anchor the block is spawned in.
    pub spawn: SpawnRegion,

    /// Offset added to the spawn position, typically lifting the block onto the floor.
    pub spawn_offset: Vector3<f32>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,
            reward: RewardConfig::default(),
            auto_grasp_distance: None,
            auto_release: false,
            randomize_pose: false,
            spawn: SpawnRegion::Rect {
                half_x: 0.05,
                half_z: 0.05,
            },
            spawn_offset: Vector3::new(0.0, 0.025, 0.0),
        }
    }
}

impl TaskConfig {
    /// Sets the time step.
    pub fn dt(mut self, v: f32) -> Self {
        self.dt = v;
        self
    }

    /// Sets the reward function.
    pub fn reward(mut self, v: RewardConfig) -> Self {
        self.reward = v;
        self
    }

    /// Sets the automatic grasp distance.
    pub fn auto_grasp_distance(mut self, v: Option<f32>) -> Self {
        self.auto_grasp_distance = v;
        self
    }

    /// Sets the automatic release flag.
    pub fn auto_release(mut self, v: bool) -> Self {
        self.auto_release = v;
        self
    }

    /// Sets the pose randomization flag.
    pub fn randomize_pose(mut self, v: bool) -> Self {
        self.randomize_pose = v;
        self
    }

    /// Sets the spawn region.
    pub fn spawn(mut self, v: SpawnRegion) -> Self {
        self.spawn = v;
        self
    }

    /// Sets the spawn offset.
    pub fn spawn_offset(mut self, v: Vector3<f32>) -> Self {
        self.spawn_offset = v;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PickPlaceError> {
        if !(self.dt > 0.0) {
            return Err(PickPlaceError::NonPositiveTimeStep(self.dt));
        }
        if let Some(d) = self.auto_grasp_distance {
            check_distance("auto_grasp_distance", d)?;
        }
        self.reward.validate()?;
        self.spawn.validate()
    }
}
