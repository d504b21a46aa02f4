//! A simulated robotic arm picking up a block and placing it in a target zone,
//! as an [`armrl_core::Env`].
//!
//! The arm is a chain of revolute joints driven by normalized control inputs.
//! It has to move its end-effector to a block, grasp it, carry it to the
//! target zone and release it there. The episode terminates with a large
//! bonus when the released block rests close enough to the target; distances
//! shape the reward in between.
//!
//! The pieces, from the leaves up:
//!
//! * [`JointRig`] holds joint angles and integrates control inputs.
//! * [`World`] stands in for the 3D engine. It computes the end-effector
//!   position and reports gripper overlaps as [`OverlapEvent`]s.
//! * [`ProximityDetector`] turns overlap events into a touching flag.
//! * [`GraspController`] attaches and detaches the touched block.
//! * [`ActionDecoder`] maps [`PickPlaceAct`] to joint controls and a grip request.
//! * [`TaskEpisode`] runs the episode and computes the reward.
//! * [`PickPlaceEnv`] puts them behind the [`Env`](armrl_core::Env) interface.
//!
//! [`Heuristic`] drives the environment from keyboard-style input, producing
//! the same actions a learned policy would.
//!
//! Here is an example of running the discrete variant with a random policy.
//!
//! ```
//! use anyhow::Result;
//! use armrl_core::{DefaultEvaluator, Evaluator as _, Policy};
//! use armrl_pick_place_env::{PickPlaceAct, PickPlaceEnv, PickPlaceEnvConfig, PickPlaceObs};
//!
//! struct RandomPolicy;
//!
//! impl Policy<PickPlaceEnv> for RandomPolicy {
//!     fn sample(&mut self, _: &PickPlaceObs) -> PickPlaceAct {
//!         PickPlaceAct::Discrete((0..3).map(|_| fastrand::i32(0..3)).collect())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     fastrand::seed(42);
//!     let config = PickPlaceEnvConfig::discrete_grip().max_steps(Some(100));
//!     let record = DefaultEvaluator::<PickPlaceEnv>::new(&config, 0, 2)?.evaluate(&mut RandomPolicy)?;
//!     assert!(record.get_scalar("Episode length")? <= 100.0);
//!     Ok(())
//! }
//! ```
mod act;
mod decoder;
mod env;
mod episode;
mod error;
mod grasp;
mod heuristic;
mod obs;
mod proximity;
mod rig;
pub mod world;
pub use act::PickPlaceAct;
pub use decoder::{ActionConfig, ActionDecoder, ActionEncoding, DecodedAction};
pub use env::{PickPlaceEnv, PickPlaceEnvConfig, PickPlaceInfo};
pub use episode::{
    ArmPhase, BonusPolicy, EpisodeStatus, RewardConfig, StepOutcome, TaskConfig, TaskEpisode,
};
pub use error::PickPlaceError;
pub use grasp::{BodyStore, GraspController, GraspState, GraspTransition};
pub use heuristic::{Heuristic, InputSource, ManualInput, ScriptedInput};
pub use obs::{ObsField, ObsLayout, PickPlaceObs};
pub use proximity::{ObjectId, ObjectKind, OverlapEvent, ProximityDetector};
pub use rig::{Joint, JointAxis, JointConfig, JointRig};
pub use world::{World, WorldConfig};
