//! Observation for [`PickPlaceEnv`](crate::PickPlaceEnv).
use crate::{episode::TaskEpisode, world::World};
use armrl_core::Obs;
use serde::{Deserialize, Serialize};

/// Observation for [`PickPlaceEnv`](crate::PickPlaceEnv).
///
/// The elements are laid out by [`ObsLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct PickPlaceObs(pub Vec<f32>);

impl From<Vec<f32>> for PickPlaceObs {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl Obs for PickPlaceObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// A group of consecutive elements in an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObsField {
    /// Joint angles in degrees, one per joint.
    JointAngles,

    /// End-effector position (3).
    EndEffector,

    /// Block position (3).
    Block,

    /// Target-zone anchor (3).
    TargetZone,

    /// `1.0` while holding the block, `0.0` otherwise.
    Holding,

    /// Distance between the end-effector and the block.
    DistanceToBlock,

    /// Distance between the block and the target zone.
    DistanceToZone,
}

impl ObsField {
    fn dim(&self, n_joints: usize) -> usize {
        match self {
            Self::JointAngles => n_joints,
            Self::EndEffector | Self::Block | Self::TargetZone => 3,
            Self::Holding | Self::DistanceToBlock | Self::DistanceToZone => 1,
        }
    }
}

/// Ordered fields of an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsLayout {
    /// Fields in the order they appear.
    pub fields: Vec<ObsField>,
}

impl Default for ObsLayout {
    fn default() -> Self {
        Self::pick_place()
    }
}

impl ObsLayout {
    /// Creates a layout.
    pub fn new(fields: Vec<ObsField>) -> Self {
        Self { fields }
    }

    /// End-effector and block positions.
    pub fn reach() -> Self {
        Self::new(vec![ObsField::EndEffector, ObsField::Block])
    }

    /// Joint angles, end-effector, block and target positions and the holding flag.
    pub fn pick_place() -> Self {
        Self::new(vec![
            ObsField::JointAngles,
            ObsField::EndEffector,
            ObsField::Block,
            ObsField::TargetZone,
            ObsField::Holding,
        ])
    }

    /// Appends a field.
    pub fn with(mut self, field: ObsField) -> Self {
        self.fields.push(field);
        self
    }

    /// The number of elements of an observation of an arm with `n_joints` joints.
    pub fn dim(&self, n_joints: usize) -> usize {
        self.fields.iter().map(|f| f.dim(n_joints)).sum()
    }

    /// Builds the observation of the current state.
    pub fn observe(&self, episode: &TaskEpisode, world: &World) -> PickPlaceObs {
        let mut obs = Vec::with_capacity(self.dim(episode.rig().len()));

        for field in self.fields.iter() {
            match field {
                ObsField::JointAngles => obs.extend(episode.rig().angles()),
                ObsField::EndEffector => obs.extend(world.end_effector().iter()),
                ObsField::Block => obs.extend(world.block_position().iter()),
                ObsField::TargetZone => obs.extend(world.target_zone().anchor.iter()),
                ObsField::Holding => obs.push(if episode.is_holding() { 1.0 } else { 0.0 }),
                ObsField::DistanceToBlock => obs.push(world.distance_to_block()),
                ObsField::DistanceToZone => obs.push(world.block_to_target()),
            }
        }

        obs.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        episode::TaskConfig,
        rig::{JointAxis, JointConfig},
        world::WorldConfig,
    };
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn preset_dimensions() {
        assert_eq!(ObsLayout::reach().dim(2), 6);
        assert_eq!(ObsLayout::pick_place().dim(2), 12);
        assert_eq!(
            ObsLayout::pick_place()
                .with(ObsField::DistanceToBlock)
                .with(ObsField::DistanceToZone)
                .dim(3),
            15
        );
    }

    #[test]
    fn observation_follows_layout() {
        let joints = vec![
            JointConfig::new("base", JointAxis::Y, 60.0).initial(5.0),
            JointConfig::new("elbow", JointAxis::X, 60.0),
        ];
        let mut world = World::build(&WorldConfig::default());
        let mut episode = TaskEpisode::new(&joints, &TaskConfig::default());
        episode.reset(&mut world, &mut StdRng::seed_from_u64(1));

        let layout = ObsLayout::pick_place().with(ObsField::DistanceToZone);
        let obs = layout.observe(&episode, &world);
        assert_eq!(obs.len(), layout.dim(2));

        let block = world.block_position();
        assert_eq!(&obs.0[0..2], &[5.0, 0.0]);
        assert_eq!(&obs.0[5..8], block.as_slice());
        assert_eq!(&obs.0[8..11], &[0.33, 0.0, 0.0]);
        assert_eq!(obs.0[11], 0.0);
        assert_eq!(obs.0[12], world.block_to_target());
    }
}
