//! Objects of the scene.
use crate::proximity::{ObjectId, ObjectKind};
use nalgebra::Vector3;

/// Physics flags of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Physics {
    /// Moved only by its parent frame, never by the physics engine.
    pub kinematic: bool,
    /// Affected by gravity.
    pub use_gravity: bool,
}

impl Physics {
    /// A free body simulated by the physics engine.
    pub fn dynamic() -> Self {
        Self {
            kinematic: false,
            use_gravity: true,
        }
    }

    /// A body excluded from physics simulation.
    pub fn kinematic() -> Self {
        Self {
            kinematic: true,
            use_gravity: false,
        }
    }
}

/// Parent frame of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attachment {
    /// Placed in world coordinates.
    World,
    /// Attached to the end-effector frame with a local offset.
    EndEffector {
        /// Offset from the end-effector origin.
        offset: Vector3<f32>,
    },
}

/// An object in the scene.
#[derive(Debug, Clone)]
pub struct Body {
    /// Handle of the body.
    pub id: ObjectId,

    /// Kind of the body.
    pub kind: ObjectKind,

    /// World position of the center.
    pub position: Vector3<f32>,

    /// Radius of the bounding sphere, used for overlap tests.
    pub radius: f32,

    /// Parent frame.
    pub attachment: Attachment,

    /// Physics flags.
    pub physics: Physics,
}

impl Body {
    /// Creates a free body in world coordinates.
    pub fn new(id: ObjectId, kind: ObjectKind, position: Vector3<f32>, radius: f32) -> Self {
        Self {
            id,
            kind,
            position,
            radius,
            attachment: Attachment::World,
            physics: Physics::dynamic(),
        }
    }

    /// Attaches the body to the end-effector frame at local zero offset.
    pub fn attach_to_end_effector(&mut self, end_effector: &Vector3<f32>) {
        self.attachment = Attachment::EndEffector {
            offset: Vector3::zeros(),
        };
        self.position = *end_effector;
    }

    /// Moves an attached body along with the end-effector.
    pub fn follow(&mut self, end_effector: &Vector3<f32>) {
        if let Attachment::EndEffector { offset } = self.attachment {
            self.position = end_effector + offset;
        }
    }

    /// Returns the body to world coordinates, keeping its current world position.
    pub fn detach(&mut self) {
        self.attachment = Attachment::World;
    }

    /// Returns `true` if the body is attached to the end-effector.
    pub fn is_attached(&self) -> bool {
        matches!(self.attachment, Attachment::EndEffector { .. })
    }
}
