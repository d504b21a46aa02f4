//! Tracks whether the gripper touches a graspable object.
use log::trace;
use serde::{Deserialize, Serialize};

/// Handle of an object in the [`World`](crate::World).
///
/// A handle does not keep the object alive; it can outlive the object it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Kind of an object. Only blocks can be grasped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A movable block.
    Block,
    /// A spawn or target zone.
    Zone,
}

/// Overlap notification delivered by the collision system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapEvent {
    /// The object started overlapping the gripper volume.
    Enter(ObjectId, ObjectKind),
    /// The object stopped overlapping the gripper volume.
    Exit(ObjectId, ObjectKind),
}

/// Whether the end-effector currently touches a block, and which one.
#[derive(Debug, Clone, Default)]
pub struct ProximityDetector {
    touching: bool,
    candidate: Option<ObjectId>,
}

impl ProximityDetector {
    /// Creates a detector touching nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `object` as the current grasp candidate.
    pub fn on_overlap_enter(&mut self, object: ObjectId, kind: ObjectKind) {
        if kind != ObjectKind::Block {
            return;
        }
        trace!("Overlap enter: {:?}", object);
        self.touching = true;
        self.candidate = Some(object);
    }

    /// Clears the touch if `object` is the current candidate.
    ///
    /// An exit of any other object leaves the active touch in place.
    pub fn on_overlap_exit(&mut self, object: ObjectId, kind: ObjectKind) {
        if kind != ObjectKind::Block {
            return;
        }
        if self.candidate == Some(object) {
            trace!("Overlap exit: {:?}", object);
            self.touching = false;
            self.candidate = None;
        }
    }

    /// Dispatches an [`OverlapEvent`].
    pub fn handle(&mut self, event: OverlapEvent) {
        match event {
            OverlapEvent::Enter(object, kind) => self.on_overlap_enter(object, kind),
            OverlapEvent::Exit(object, kind) => self.on_overlap_exit(object, kind),
        }
    }

    /// Forgets every overlap, e.g., after objects have been teleported.
    pub fn clear(&mut self) {
        self.touching = false;
        self.candidate = None;
    }

    /// Returns `true` if the end-effector touches a block.
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// The block the end-effector touches.
    pub fn current_candidate(&self) -> Option<ObjectId> {
        self.candidate
    }
}
