//! Attaching and detaching the grasped block.
use crate::{
    proximity::{ObjectId, ProximityDetector},
    world::{Body, Physics},
};
use log::{debug, warn};
use nalgebra::Vector3;

/// Access to bodies by handle.
pub trait BodyStore {
    /// Returns the body with the given handle.
    fn body(&self, id: ObjectId) -> Option<&Body>;

    /// Returns the body with the given handle.
    fn body_mut(&mut self, id: ObjectId) -> Option<&mut Body>;
}

impl BodyStore for Vec<Body> {
    fn body(&self, id: ObjectId) -> Option<&Body> {
        self.iter().find(|b| b.id == id)
    }

    fn body_mut(&mut self, id: ObjectId) -> Option<&mut Body> {
        self.iter_mut().find(|b| b.id == id)
    }
}

/// Grasp state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraspState {
    /// Nothing is held.
    Free,

    /// `object` is attached to the end-effector.
    Held {
        /// The held object.
        object: ObjectId,
        /// World y-coordinate of the object before it was grasped.
        pre_grasp_height: f32,
    },
}

/// Result of a [`GraspController`] operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraspTransition {
    /// Nothing changed.
    Ignored,
    /// The object was grasped.
    Grasped(ObjectId),
    /// The object was released.
    Released(ObjectId),
    /// The held object no longer existed; the state was forced to free.
    Recovered,
}

/// Free/held state machine of the gripper.
///
/// Toggling is the only way in or out of the held state, whether the toggle
/// comes from a learned policy, a keyboard or the automatic grasp of a task.
#[derive(Debug, Clone)]
pub struct GraspController {
    state: GraspState,
}

impl Default for GraspController {
    fn default() -> Self {
        Self {
            state: GraspState::Free,
        }
    }
}

impl GraspController {
    /// Creates a controller holding nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> GraspState {
        self.state
    }

    /// Returns `true` if an object is held.
    pub fn is_holding(&self) -> bool {
        matches!(self.state, GraspState::Held { .. })
    }

    /// The held object.
    pub fn held(&self) -> Option<ObjectId> {
        match self.state {
            GraspState::Held { object, .. } => Some(object),
            GraspState::Free => None,
        }
    }

    /// Grasps the touched block when free, releases the held one otherwise.
    ///
    /// Grasping needs `proximity` to report a touched candidate that exists in
    /// `bodies`; without one the toggle is ignored.
    pub fn toggle<B>(
        &mut self,
        proximity: &ProximityDetector,
        bodies: &mut B,
        end_effector: &Vector3<f32>,
    ) -> GraspTransition
    where
        B: BodyStore + ?Sized,
    {
        match self.state {
            GraspState::Free => self.grasp(proximity, bodies, end_effector),
            GraspState::Held {
                object,
                pre_grasp_height,
            } => self.release(bodies, object, pre_grasp_height, Some(end_effector)),
        }
    }

    /// Releases the held object, if any, regardless of proximity.
    ///
    /// The object keeps the world position it was last synced to.
    pub fn force_release<B>(&mut self, bodies: &mut B) -> GraspTransition
    where
        B: BodyStore + ?Sized,
    {
        match self.state {
            GraspState::Free => GraspTransition::Ignored,
            GraspState::Held {
                object,
                pre_grasp_height,
            } => self.release(bodies, object, pre_grasp_height, None),
        }
    }

    fn grasp<B>(
        &mut self,
        proximity: &ProximityDetector,
        bodies: &mut B,
        end_effector: &Vector3<f32>,
    ) -> GraspTransition
    where
        B: BodyStore + ?Sized,
    {
        if !proximity.is_touching() {
            return GraspTransition::Ignored;
        }
        let object = match proximity.current_candidate() {
            Some(object) => object,
            None => return GraspTransition::Ignored,
        };
        let body = match bodies.body_mut(object) {
            Some(body) => body,
            None => return GraspTransition::Ignored,
        };

        let pre_grasp_height = body.position.y;
        body.physics = Physics::kinematic();
        body.attach_to_end_effector(end_effector);
        self.state = GraspState::Held {
            object,
            pre_grasp_height,
        };
        debug!("Grasped {:?} at height {}", object, pre_grasp_height);

        GraspTransition::Grasped(object)
    }

    fn release<B>(
        &mut self,
        bodies: &mut B,
        object: ObjectId,
        pre_grasp_height: f32,
        end_effector: Option<&Vector3<f32>>,
    ) -> GraspTransition
    where
        B: BodyStore + ?Sized,
    {
        self.state = GraspState::Free;

        let body = match bodies.body_mut(object) {
            Some(body) => body,
            None => {
                warn!("Held object {:?} is missing, forced the gripper free", object);
                return GraspTransition::Recovered;
            }
        };

        if let Some(end_effector) = end_effector {
            body.follow(end_effector);
        }
        body.detach();
        body.position.y = pre_grasp_height;
        body.physics = Physics::dynamic();
        debug!("Released {:?} at {:?}", object, body.position);

        GraspTransition::Released(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::ObjectKind;

    const BLOCK: ObjectId = ObjectId(0);

    fn bodies() -> Vec<Body> {
        vec![Body::new(
            BLOCK,
            ObjectKind::Block,
            Vector3::new(0.3, 0.025, 0.1),
            0.025,
        )]
    }

    fn touching() -> ProximityDetector {
        let mut proximity = ProximityDetector::new();
        proximity.on_overlap_enter(BLOCK, ObjectKind::Block);
        proximity
    }

    #[test]
    fn toggle_without_touch_is_ignored() {
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        let proximity = ProximityDetector::new();
        let ee = Vector3::new(0.3, 0.03, 0.1);

        assert_eq!(grasp.toggle(&proximity, &mut bodies, &ee), GraspTransition::Ignored);
        assert_eq!(grasp.state(), GraspState::Free);
        assert_eq!(bodies[0].physics, Physics::dynamic());
        assert!(!bodies[0].is_attached());
    }

    #[test]
    fn grasp_attaches_and_disables_physics() {
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        let ee = Vector3::new(0.3, 0.05, 0.1);

        assert_eq!(
            grasp.toggle(&touching(), &mut bodies, &ee),
            GraspTransition::Grasped(BLOCK)
        );
        assert!(grasp.is_holding());
        assert_eq!(grasp.held(), Some(BLOCK));
        assert_eq!(
            grasp.state(),
            GraspState::Held {
                object: BLOCK,
                pre_grasp_height: 0.025
            }
        );
        assert_eq!(bodies[0].physics, Physics::kinematic());
        assert_eq!(bodies[0].position, ee);
    }

    #[test]
    fn release_restores_height_only() {
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        let proximity = touching();

        grasp.toggle(&proximity, &mut bodies, &Vector3::new(0.3, 0.05, 0.1));
        let ee = Vector3::new(-0.2, 0.4, 0.25);
        assert_eq!(
            grasp.toggle(&proximity, &mut bodies, &ee),
            GraspTransition::Released(BLOCK)
        );

        assert!(!grasp.is_holding());
        assert_eq!(bodies[0].position, Vector3::new(-0.2, 0.025, 0.25));
        assert_eq!(bodies[0].physics, Physics::dynamic());
        assert!(!bodies[0].is_attached());
    }

    #[test]
    fn double_toggle_returns_to_original_state() {
        let ee = Vector3::new(0.3, 0.05, 0.1);

        // Touching: free -> held -> free.
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        let proximity = touching();
        grasp.toggle(&proximity, &mut bodies, &ee);
        grasp.toggle(&proximity, &mut bodies, &ee);
        assert_eq!(grasp.state(), GraspState::Free);

        // Not touching: both toggles fail.
        let proximity = ProximityDetector::new();
        grasp.toggle(&proximity, &mut bodies, &ee);
        grasp.toggle(&proximity, &mut bodies, &ee);
        assert_eq!(grasp.state(), GraspState::Free);
    }

    #[test]
    fn release_does_not_need_touch() {
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        let ee = Vector3::new(0.3, 0.05, 0.1);
        grasp.toggle(&touching(), &mut bodies, &ee);

        let transition = grasp.toggle(&ProximityDetector::new(), &mut bodies, &ee);
        assert_eq!(transition, GraspTransition::Released(BLOCK));
    }

    #[test]
    fn missing_held_object_recovers_to_free() {
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        let ee = Vector3::new(0.3, 0.05, 0.1);
        grasp.toggle(&touching(), &mut bodies, &ee);
        bodies.clear();

        assert_eq!(
            grasp.toggle(&touching(), &mut bodies, &ee),
            GraspTransition::Recovered
        );
        assert_eq!(grasp.state(), GraspState::Free);
    }

    #[test]
    fn force_release() {
        let mut grasp = GraspController::new();
        let mut bodies = bodies();
        assert_eq!(grasp.force_release(&mut bodies), GraspTransition::Ignored);

        grasp.toggle(&touching(), &mut bodies, &Vector3::new(0.3, 0.2, 0.1));
        assert_eq!(grasp.force_release(&mut bodies), GraspTransition::Released(BLOCK));
        assert!(!grasp.is_holding());
        assert_eq!(bodies[0].position.y, 0.025);
    }

    #[test]
    fn candidate_missing_from_store_is_ignored() {
        let mut grasp = GraspController::new();
        let mut proximity = ProximityDetector::new();
        proximity.on_overlap_enter(ObjectId(9), ObjectKind::Block);

        let transition = grasp.toggle(&proximity, &mut bodies(), &Vector3::zeros());
        assert_eq!(transition, GraspTransition::Ignored);
        assert!(!grasp.is_holding());
    }
}
