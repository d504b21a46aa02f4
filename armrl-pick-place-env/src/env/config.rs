//! Configuration of [`PickPlaceEnv`](super::PickPlaceEnv).
use crate::{
    decoder::{ActionConfig, ActionEncoding},
    episode::{RewardConfig, TaskConfig},
    error::PickPlaceError,
    obs::{ObsField, ObsLayout},
    rig::{JointAxis, JointConfig},
    world::{SpawnRegion, WorldConfig},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PickPlaceEnv`](super::PickPlaceEnv).
///
/// Two presets correspond to the variants of the task:
///
/// * [`PickPlaceEnvConfig::reach_and_carry`] (the default) takes continuous
///   actions. The gripper closes by itself near the block and opens by itself
///   over the target zone.
/// * [`PickPlaceEnvConfig::discrete_grip`] takes discrete actions with a grip
///   channel, starts from a random pose and pays small milestone bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickPlaceEnvConfig {
    /// Joints of the arm, from the base.
    pub joints: Vec<JointConfig>,

    /// Scene.
    pub world: WorldConfig,

    /// Episode and reward.
    pub task: TaskConfig,

    /// Action encoding.
    pub action: ActionConfig,

    /// Observation layout.
    pub obs_layout: ObsLayout,

    /// Episodes are truncated after this many steps.
    pub max_steps: Option<usize>,
}

impl Default for PickPlaceEnvConfig {
    fn default() -> Self {
        Self::reach_and_carry()
    }
}

fn default_joints() -> Vec<JointConfig> {
    vec![
        JointConfig::new("base", JointAxis::Y, 60.0),
        JointConfig::new("elbow", JointAxis::X, 60.0),
    ]
}

impl PickPlaceEnvConfig {
    /// Continuous control with automatic grasp and release.
    pub fn reach_and_carry() -> Self {
        Self {
            joints: default_joints(),
            world: WorldConfig::default(),
            task: TaskConfig::default()
                .reward(RewardConfig::default())
                .auto_grasp_distance(Some(0.07))
                .auto_release(true)
                .spawn(SpawnRegion::Rect {
                    half_x: 0.05,
                    half_z: 0.05,
                }),
            action: ActionConfig::default(),
            obs_layout: ObsLayout::pick_place(),
            max_steps: Some(1000),
        }
    }

    /// Discrete control with an explicit grip channel.
    pub fn discrete_grip() -> Self {
        let joints = vec![
            JointConfig::new("base", JointAxis::Y, 60.0).reset_range(-45.0, 45.0),
            JointConfig::new("elbow", JointAxis::X, 60.0).reset_range(-30.0, 30.0),
        ];
        let reward = RewardConfig::default()
            .approach_coef(0.002)
            .transport_coef(0.002)
            .approach_bonus(0.5, 0.05)
            .grasp_bonus(2.0)
            .placement_bonus(5.0, 0.1)
            .time_penalty(0.0005);

        Self {
            joints,
            world: WorldConfig::default(),
            task: TaskConfig::default()
                .reward(reward)
                .randomize_pose(true)
                .spawn(SpawnRegion::Disc { radius: 0.05 }),
            action: ActionConfig::default().encoding(ActionEncoding::Discrete),
            obs_layout: ObsLayout::pick_place()
                .with(ObsField::DistanceToBlock)
                .with(ObsField::DistanceToZone),
            max_steps: Some(2000),
        }
    }

    /// Sets the joints.
    pub fn joints(mut self, v: Vec<JointConfig>) -> Self {
        self.joints = v;
        self
    }

    /// Sets the scene.
    pub fn world(mut self, v: WorldConfig) -> Self {
        self.world = v;
        self
    }

    /// Sets the episode and reward configuration.
    pub fn task(mut self, v: TaskConfig) -> Self {
        self.task = v;
        self
    }

    /// Sets the action encoding.
    pub fn action(mut self, v: ActionConfig) -> Self {
        self.action = v;
        self
    }

    /// Sets the observation layout.
    pub fn obs_layout(mut self, v: ObsLayout) -> Self {
        self.obs_layout = v;
        self
    }

    /// Sets the step ceiling.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), PickPlaceError> {
        if self.joints.is_empty() {
            return Err(PickPlaceError::NoJoints);
        }
        for joint in self.joints.iter() {
            joint.validate()?;
        }
        let links = self.world.chain.links.len();
        if links != self.joints.len() {
            return Err(PickPlaceError::ChainMismatch {
                links,
                joints: self.joints.len(),
            });
        }
        self.world.validate()?;
        self.task.validate()?;
        self.action.validate(self.joints.len())?;

        if let Some(distance) = self.task.auto_grasp_distance {
            let reach = self.world.trigger_radius + self.world.block_radius;
            if distance > reach {
                return Err(PickPlaceError::UnreachableAutoGrasp { distance, reach });
            }
        }

        Ok(())
    }

    /// Constructs [`PickPlaceEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PickPlaceEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
