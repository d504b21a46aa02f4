//! The simulated scene around the arm.
//!
//! [`World`] stands in for the 3D engine: it owns the bodies, computes the
//! end-effector position with a [`Kinematics`] implementation, keeps attached
//! bodies on the end-effector and reports gripper overlaps as
//! [`OverlapEvent`]s. It does not simulate dynamics; a released body stays
//! where it is put.
mod body;
mod kinematics;
mod trigger;
mod zone;
use crate::{
    error::{check_distance, PickPlaceError},
    grasp::BodyStore,
    proximity::{ObjectId, ObjectKind, OverlapEvent},
    rig::JointRig,
};
pub use body::{Attachment, Body, Physics};
pub use kinematics::{ChainConfig, Kinematics, SerialChain};
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
pub use trigger::TriggerVolume;
pub use zone::{SpawnRegion, Zone};

/// Handle of the block.
pub const BLOCK: ObjectId = ObjectId(0);

/// Handle of the spawn zone.
pub const SPAWN_ZONE: ObjectId = ObjectId(1);

/// Handle of the target zone.
pub const TARGET_ZONE: ObjectId = ObjectId(2);

/// Configuration of [`World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Kinematic chain of the arm.
    pub chain: ChainConfig,

    /// Zone the block is spawned in.
    pub spawn_zone: Zone,

    /// Zone the block has to be placed in.
    pub target_zone: Zone,

    /// Radius of the block's bounding sphere.
    pub block_radius: f32,

    /// Radius of the gripper trigger volume.
    pub trigger_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let half_extents = Vector3::new(0.1, 0.005, 0.1);
        Self {
            chain: ChainConfig::default(),
            spawn_zone: Zone::new(Vector3::new(0.0, 0.0, 0.33), half_extents),
            target_zone: Zone::new(Vector3::new(0.33, 0.0, 0.0), half_extents),
            block_radius: 0.025,
            trigger_radius: 0.05,
        }
    }
}

impl WorldConfig {
    /// Sets the kinematic chain.
    pub fn chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }

    /// Sets the spawn zone.
    pub fn spawn_zone(mut self, zone: Zone) -> Self {
        self.spawn_zone = zone;
        self
    }

    /// Sets the target zone.
    pub fn target_zone(mut self, zone: Zone) -> Self {
        self.target_zone = zone;
        self
    }

    /// Sets the radius of the gripper trigger volume.
    pub fn trigger_radius(mut self, v: f32) -> Self {
        self.trigger_radius = v;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PickPlaceError> {
        check_distance("block_radius", self.block_radius)?;
        check_distance("trigger_radius", self.trigger_radius)
    }
}

/// Bodies, zones and the arm's kinematics.
pub struct World {
    bodies: Vec<Body>,
    spawn_zone: Zone,
    target_zone: Zone,
    kinematics: Box<dyn Kinematics>,
    trigger: TriggerVolume,
    end_effector: Vector3<f32>,
}

impl World {
    /// Builds the world with a [`SerialChain`] from the configuration.
    pub fn build(config: &WorldConfig) -> Self {
        Self::with_kinematics(config, Box::new(SerialChain::new(&config.chain)))
    }

    /// Builds the world with the given kinematics.
    pub fn with_kinematics(config: &WorldConfig, kinematics: Box<dyn Kinematics>) -> Self {
        let spawn = &config.spawn_zone;
        let target = &config.target_zone;
        let bodies = vec![
            Body::new(BLOCK, ObjectKind::Block, spawn.anchor, config.block_radius),
            Body::new(SPAWN_ZONE, ObjectKind::Zone, spawn.anchor, spawn.bounding_radius()),
            Body::new(TARGET_ZONE, ObjectKind::Zone, target.anchor, target.bounding_radius()),
        ];

        Self {
            bodies,
            spawn_zone: spawn.clone(),
            target_zone: target.clone(),
            kinematics,
            trigger: TriggerVolume::new(config.trigger_radius),
            end_effector: Vector3::zeros(),
        }
    }

    /// Moves the end-effector to the pose of `rig`, drags attached bodies along
    /// and returns the overlap events of the gripper trigger.
    pub fn sync(&mut self, rig: &JointRig) -> Vec<OverlapEvent> {
        self.end_effector = self.kinematics.end_effector(rig);
        let end_effector = self.end_effector;
        for body in self.bodies.iter_mut() {
            body.follow(&end_effector);
        }
        let events = self.trigger.update(&end_effector, self.bodies.iter());
        if !events.is_empty() {
            trace!("Overlap events: {:?}", events);
        }
        events
    }

    /// Forgets gripper overlaps, so that the next [`World::sync`] reports
    /// every overlapping body as entering.
    pub fn clear_overlaps(&mut self) {
        self.trigger.clear();
    }

    /// Puts the block at `position` as a free body.
    pub fn place_block(&mut self, position: Vector3<f32>) {
        if let Some(block) = self.body_mut(BLOCK) {
            block.detach();
            block.physics = Physics::dynamic();
            block.position = position;
        }
    }

    /// Removes a body from the scene, returning it.
    pub fn remove(&mut self, id: ObjectId) -> Option<Body> {
        let ix = self.bodies.iter().position(|b| b.id == id)?;
        Some(self.bodies.remove(ix))
    }

    /// End-effector position as of the last [`World::sync`].
    pub fn end_effector(&self) -> Vector3<f32> {
        self.end_effector
    }

    /// Position of the block. Falls back to the spawn anchor if the block was removed.
    pub fn block_position(&self) -> Vector3<f32> {
        self.body(BLOCK)
            .map(|b| b.position)
            .unwrap_or(self.spawn_zone.anchor)
    }

    /// Distance between the end-effector and the block.
    pub fn distance_to_block(&self) -> f32 {
        (self.end_effector - self.block_position()).norm()
    }

    /// Distance between the block and the anchor of the target zone.
    pub fn block_to_target(&self) -> f32 {
        (self.block_position() - self.target_zone.anchor).norm()
    }

    /// Spawn zone.
    pub fn spawn_zone(&self) -> &Zone {
        &self.spawn_zone
    }

    /// Target zone.
    pub fn target_zone(&self) -> &Zone {
        &self.target_zone
    }

    /// All bodies.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }
}

impl BodyStore for World {
    fn body(&self, id: ObjectId) -> Option<&Body> {
        self.bodies.body(id)
    }

    fn body_mut(&mut self, id: ObjectId) -> Option<&mut Body> {
        self.bodies.body_mut(id)
    }
}
