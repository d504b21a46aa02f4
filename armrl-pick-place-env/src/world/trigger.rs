//! Gripper trigger volume.
use super::Body;
use crate::proximity::{ObjectId, OverlapEvent};
use nalgebra::Vector3;
use std::collections::BTreeSet;

/// A sphere around the end-effector reporting bodies entering and leaving it.
#[derive(Debug, Clone)]
pub struct TriggerVolume {
    radius: f32,
    inside: BTreeSet<ObjectId>,
}

impl TriggerVolume {
    /// Creates an empty trigger.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            inside: BTreeSet::new(),
        }
    }

    /// Radius of the sphere.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Tests every body against the sphere centered at `center`.
    ///
    /// Returns exit events before enter events, each in ascending id order.
    pub fn update<'a>(
        &mut self,
        center: &Vector3<f32>,
        bodies: impl IntoIterator<Item = &'a Body>,
    ) -> Vec<OverlapEvent> {
        let mut exits = vec![];
        let mut enters = vec![];

        for body in bodies {
            let overlaps = (body.position - center).norm() <= self.radius + body.radius;
            let was_inside = self.inside.contains(&body.id);
            if overlaps && !was_inside {
                self.inside.insert(body.id);
                enters.push(OverlapEvent::Enter(body.id, body.kind));
            } else if !overlaps && was_inside {
                self.inside.remove(&body.id);
                exits.push(OverlapEvent::Exit(body.id, body.kind));
            }
        }

        exits.sort_by_key(event_id);
        enters.sort_by_key(event_id);
        exits.extend(enters);
        exits
    }

    /// Forgets which bodies were inside.
    pub fn clear(&mut self) {
        self.inside.clear();
    }
}

fn event_id(event: &OverlapEvent) -> ObjectId {
    match *event {
        OverlapEvent::Enter(id, _) | OverlapEvent::Exit(id, _) => id,
    }
}
