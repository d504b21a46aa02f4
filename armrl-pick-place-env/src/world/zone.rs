//! Spawn and target zones.
use crate::error::{check_distance, PickPlaceError};
use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A flat box on the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Center of the zone surface.
    pub anchor: Vector3<f32>,

    /// Half extents along x, y and z.
    pub half_extents: Vector3<f32>,
}

impl Zone {
    /// Creates a zone.
    pub fn new(anchor: Vector3<f32>, half_extents: Vector3<f32>) -> Self {
        Self {
            anchor,
            half_extents,
        }
    }

    /// Returns `true` if `p` is inside the box.
    pub fn contains(&self, p: &Vector3<f32>) -> bool {
        let d = p - self.anchor;
        d.x.abs() <= self.half_extents.x
            && d.y.abs() <= self.half_extents.y
            && d.z.abs() <= self.half_extents.z
    }

    /// Radius of the bounding sphere.
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents.norm()
    }
}

/// Planar region in which the block is spawned, relative to the spawn-zone anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpawnRegion {
    /// Uniform in `[-half_x, half_x] × [-half_z, half_z]`.
    Rect {
        /// Half extent along x.
        half_x: f32,
        /// Half extent along z.
        half_z: f32,
    },

    /// Uniform in a disc.
    Disc {
        /// Radius of the disc.
        radius: f32,
    },
}

impl SpawnRegion {
    /// Samples a planar offset; the y component is always zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f32> {
        match *self {
            Self::Rect { half_x, half_z } => Vector3::new(
                rng.gen_range(-half_x..=half_x),
                0.0,
                rng.gen_range(-half_z..=half_z),
            ),
            Self::Disc { radius } => {
                let r = radius * rng.gen::<f32>().sqrt();
                let theta = 2.0 * PI * rng.gen::<f32>();
                Vector3::new(r * theta.cos(), 0.0, r * theta.sin())
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), PickPlaceError> {
        match *self {
            Self::Rect { half_x, half_z } => {
                check_distance("spawn.half_x", half_x)?;
                check_distance("spawn.half_z", half_z)
            }
            Self::Disc { radius } => check_distance("spawn.radius", radius),
        }
    }
}
