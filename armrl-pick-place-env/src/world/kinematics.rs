//! Forward kinematics of the arm.
use crate::rig::JointRig;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Computes the world position of the end-effector from joint angles.
pub trait Kinematics {
    /// World position of the end-effector.
    fn end_effector(&self, rig: &JointRig) -> Vector3<f32>;
}

/// Configuration of a [`SerialChain`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// World position of the first joint.
    pub origin: Vector3<f32>,

    /// `links[i]` is the offset from joint `i` to the next joint, or to the
    /// end-effector for the last joint, in the frame of joint `i`.
    pub links: Vec<Vector3<f32>>,
}

impl Default for ChainConfig {
    /// A yawing base with a 0.25 column and a pitching arm of length 0.4.
    fn default() -> Self {
        Self {
            origin: Vector3::zeros(),
            links: vec![Vector3::new(0.0, 0.25, 0.0), Vector3::new(0.0, 0.0, 0.4)],
        }
    }
}

/// Serial chain of revolute joints.
///
/// Each joint rotates the frames of all joints after it. Joints beyond the
/// last link do not move the end-effector.
#[derive(Debug, Clone)]
pub struct SerialChain {
    origin: Vector3<f32>,
    links: Vec<Vector3<f32>>,
}

impl SerialChain {
    /// Builds the chain.
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            origin: config.origin,
            links: config.links.clone(),
        }
    }
}

impl Kinematics for SerialChain {
    fn end_effector(&self, rig: &JointRig) -> Vector3<f32> {
        let mut rotation = UnitQuaternion::identity();
        let mut position = self.origin;

        for (joint, link) in rig.joints().iter().zip(self.links.iter()) {
            rotation *= UnitQuaternion::from_axis_angle(&joint.axis().unit(), joint.angle().to_radians());
            position += rotation * link;
        }

        position
    }
}
