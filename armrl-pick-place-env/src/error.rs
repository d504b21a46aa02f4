//! Errors in building [`PickPlaceEnv`](crate::PickPlaceEnv).
//!
//! Nothing in a running episode fails: invalid grips are ignored and
//! inconsistent grasp states are corrected in place. Only configurations are
//! rejected, when the environment is built.
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum PickPlaceError {
    /// The arm has no joints.
    #[error("the arm needs at least one joint")]
    NoJoints,

    /// Δt of a simulation step is zero or negative.
    #[error("time step must be positive, got {0}")]
    NonPositiveTimeStep(f32),

    /// An action channel drives a joint the arm does not have.
    #[error("action channel {channel} drives joint {joint}, but the arm has {n_joints} joints")]
    UnknownJoint {
        /// Index of the action channel.
        channel: usize,
        /// Index of the joint.
        joint: usize,
        /// Number of joints of the arm.
        n_joints: usize,
    },

    /// The kinematic chain and the joint list disagree.
    #[error("kinematic chain has {links} links for {joints} joints")]
    ChainMismatch {
        /// Number of links.
        links: usize,
        /// Number of joints.
        joints: usize,
    },

    /// A distance threshold or radius is negative or not finite.
    #[error("invalid value for `{name}`: {value}")]
    InvalidThreshold {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A joint range has its lower bound above its upper bound.
    #[error("invalid range for joint `{joint}`: {lo}..={hi}")]
    InvalidRange {
        /// Name of the joint.
        joint: String,
        /// Lower bound.
        lo: f32,
        /// Upper bound.
        hi: f32,
    },

    /// Automatic grasping can never succeed because the trigger volume is too small.
    #[error("automatic grasp distance {distance} exceeds the trigger reach {reach}")]
    UnreachableAutoGrasp {
        /// Automatic grasp distance.
        distance: f32,
        /// Trigger radius plus block radius.
        reach: f32,
    },
}

/// Checks that `value` is a finite, non-negative distance.
pub(crate) fn check_distance(name: &'static str, value: f32) -> Result<(), PickPlaceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PickPlaceError::InvalidThreshold { name, value })
    }
}
