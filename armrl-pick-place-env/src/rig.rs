//! Joint-angle state of the arm.
use crate::error::PickPlaceError;
use log::warn;
use nalgebra::{Unit, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rotation axis of a joint in its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointAxis {
    /// Pitch.
    X,
    /// Yaw.
    Y,
    /// Roll.
    Z,
}

impl JointAxis {
    /// Returns the unit vector of the axis.
    pub fn unit(&self) -> Unit<Vector3<f32>> {
        match self {
            Self::X => Vector3::x_axis(),
            Self::Y => Vector3::y_axis(),
            Self::Z => Vector3::z_axis(),
        }
    }
}

/// Configuration of a joint. Angles are in degrees, speeds in degrees per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Name of the joint, used in logs.
    pub name: String,

    /// Rotation axis.
    pub axis: JointAxis,

    /// Maximum angular speed, reached with control input 1.
    pub speed: f32,

    /// Angle at the beginning of an episode without randomization.
    #[serde(default)]
    pub initial: f32,

    /// Range of the uniformly sampled angle at the beginning of an episode.
    #[serde(default)]
    pub reset_range: Option<(f32, f32)>,

    /// Angle limits. The angle is not clamped if `None`.
    #[serde(default)]
    pub limits: Option<(f32, f32)>,
}

impl JointConfig {
    /// Creates a joint rotating about `axis` at `speed` degrees per second.
    pub fn new(name: impl Into<String>, axis: JointAxis, speed: f32) -> Self {
        Self {
            name: name.into(),
            axis,
            speed,
            initial: 0.0,
            reset_range: None,
            limits: None,
        }
    }

    /// Sets the initial angle.
    pub fn initial(mut self, v: f32) -> Self {
        self.initial = v;
        self
    }

    /// Sets the range of randomized initial angles.
    pub fn reset_range(mut self, lo: f32, hi: f32) -> Self {
        self.reset_range = Some((lo, hi));
        self
    }

    /// Sets angle limits.
    pub fn limits(mut self, lo: f32, hi: f32) -> Self {
        self.limits = Some((lo, hi));
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PickPlaceError> {
        for (lo, hi) in self.reset_range.iter().chain(self.limits.iter()) {
            if !(lo <= hi) {
                return Err(PickPlaceError::InvalidRange {
                    joint: self.name.clone(),
                    lo: *lo,
                    hi: *hi,
                });
            }
        }
        Ok(())
    }
}

/// A joint and its current angle.
#[derive(Debug, Clone)]
pub struct Joint {
    config: JointConfig,
    angle: f32,
}

impl Joint {
    /// Name of the joint.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Rotation axis.
    pub fn axis(&self) -> JointAxis {
        self.config.axis
    }

    /// Current angle in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    fn set_angle(&mut self, angle: f32) {
        self.angle = match self.config.limits {
            Some((lo, hi)) => angle.clamp(lo, hi),
            None => angle,
        };
    }
}

/// Ordered joints of the arm, from the base to the wrist.
#[derive(Debug, Clone)]
pub struct JointRig {
    joints: Vec<Joint>,
}

impl JointRig {
    /// Builds a rig with every joint at its initial angle.
    pub fn new(configs: &[JointConfig]) -> Self {
        Self {
            joints: configs
                .iter()
                .map(|config| Joint {
                    config: config.clone(),
                    angle: config.initial,
                })
                .collect(),
        }
    }

    /// Rotates joint `ix` by `input × speed × dt`.
    ///
    /// `input` is nominally in `[-1, 1]` but is not clamped.
    pub fn apply_control(&mut self, ix: usize, input: f32, dt: f32) {
        match self.joints.get_mut(ix) {
            Some(joint) => {
                let delta = input * joint.config.speed * dt;
                joint.set_angle(joint.angle + delta);
            }
            None => warn!("Ignored control for unknown joint {}", ix),
        }
    }

    /// Sets joint angles in order. Joints without a corresponding value keep their angle.
    pub fn reset_pose(&mut self, angles: &[f32]) {
        for (joint, &angle) in self.joints.iter_mut().zip(angles) {
            joint.set_angle(angle);
        }
    }

    /// Sets every joint to its initial angle.
    pub fn reset_initial(&mut self) {
        for joint in self.joints.iter_mut() {
            joint.set_angle(joint.config.initial);
        }
    }

    /// Samples every joint uniformly inside its reset range.
    ///
    /// Joints without a reset range go back to their initial angle.
    pub fn reset_randomized<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for joint in self.joints.iter_mut() {
            let angle = match joint.config.reset_range {
                Some((lo, hi)) => rng.gen_range(lo..=hi),
                None => joint.config.initial,
            };
            joint.set_angle(angle);
        }
    }

    /// Current angles in degrees.
    pub fn angles(&self) -> Vec<f32> {
        self.joints.iter().map(|j| j.angle).collect()
    }

    /// Returns the joints.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Returns `true` if the rig has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn rig() -> JointRig {
        JointRig::new(&[
            JointConfig::new("base", JointAxis::Y, 60.0).reset_range(-45.0, 45.0),
            JointConfig::new("elbow", JointAxis::X, 30.0).initial(10.0),
        ])
    }

    #[test]
    fn control_is_linear_in_input() {
        for &input in &[-1.0f32, -0.5, 0.0, 0.25, 1.0] {
            for &dt in &[0.02f32, 0.1] {
                let mut rig = rig();
                rig.apply_control(1, input, dt);
                assert_relative_eq!(rig.angles()[1], 10.0 + input * 30.0 * dt, epsilon = 1e-5);
                assert_eq!(rig.angles()[0], 0.0);
            }
        }
    }

    #[test]
    fn input_is_not_clamped() {
        let mut rig = rig();
        rig.apply_control(0, 3.0, 0.1);
        assert_relative_eq!(rig.angles()[0], 18.0, epsilon = 1e-5);
    }

    #[test]
    fn limits_clamp_when_configured() {
        let mut rig = JointRig::new(&[JointConfig::new("base", JointAxis::Y, 60.0).limits(-5.0, 5.0)]);
        rig.apply_control(0, 1.0, 1.0);
        assert_eq!(rig.angles(), vec![5.0]);
    }

    #[test]
    fn unknown_joint_is_ignored() {
        let mut rig = rig();
        rig.apply_control(7, 1.0, 1.0);
        assert_eq!(rig.angles(), vec![0.0, 10.0]);
    }

    #[test]
    fn randomized_reset_stays_in_range() {
        let mut rig = rig();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            rig.reset_randomized(&mut rng);
            let angles = rig.angles();
            assert!((-45.0..=45.0).contains(&angles[0]));
            assert_eq!(angles[1], 10.0);
        }
    }

    #[test]
    fn reset_pose_sets_given_angles() {
        let mut rig = rig();
        rig.reset_pose(&[12.0]);
        assert_eq!(rig.angles(), vec![12.0, 10.0]);
        rig.reset_initial();
        assert_eq!(rig.angles(), vec![0.0, 10.0]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = JointConfig::new("base", JointAxis::Y, 60.0).reset_range(10.0, -10.0);
        assert!(matches!(
            config.validate(),
            Err(PickPlaceError::InvalidRange { .. })
        ));
    }
}
