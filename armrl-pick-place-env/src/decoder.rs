//! Interpretation of actions as joint controls and grip requests.
use crate::{error::PickPlaceError, PickPlaceAct};
use log::debug;
use serde::{Deserialize, Serialize};

/// Action encoding expected by a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEncoding {
    /// One scalar per channel, no grip channel.
    Continuous,

    /// One integer in `{0, 1, 2}` per channel, plus a grip channel.
    Discrete,
}

/// Configuration of [`ActionDecoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Expected encoding.
    pub encoding: ActionEncoding,

    /// `channels[i]` is the joint driven by action channel `i`.
    pub channels: Vec<usize>,
}

impl Default for ActionConfig {
    /// Continuous actions, channel 0 driving the base and channel 1 the secondary joint.
    fn default() -> Self {
        Self {
            encoding: ActionEncoding::Continuous,
            channels: vec![0, 1],
        }
    }
}

impl ActionConfig {
    /// Sets the encoding.
    pub fn encoding(mut self, v: ActionEncoding) -> Self {
        self.encoding = v;
        self
    }

    /// Sets the joints driven by the action channels.
    pub fn channels(mut self, v: Vec<usize>) -> Self {
        self.channels = v;
        self
    }

    pub(crate) fn validate(&self, n_joints: usize) -> Result<(), PickPlaceError> {
        match self.channels.iter().enumerate().find(|&(_, &joint)| joint >= n_joints) {
            Some((channel, &joint)) => Err(PickPlaceError::UnknownJoint {
                channel,
                joint,
                n_joints,
            }),
            None => Ok(()),
        }
    }
}

/// Joint controls and grip request decoded from an action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedAction {
    /// `(joint, input)` pairs, in channel order.
    pub controls: Vec<(usize, f32)>,

    /// `true` if the gripper should toggle in this step.
    pub grip_toggle: bool,
}

/// Maps [`PickPlaceAct`] to [`DecodedAction`].
///
/// Continuous inputs are passed through as they are. A discrete value `v` on a
/// joint channel becomes the input `v - 1`, i.e., `0`, `1` and `2` turn the
/// joint backward, hold it and turn it forward. Neither is clamped. The grip
/// channel follows the joint channels; `1` requests a toggle.
///
/// Missing channels read as zero input and no grip.
#[derive(Debug, Clone)]
pub struct ActionDecoder {
    config: ActionConfig,
}

impl ActionDecoder {
    /// Creates a decoder.
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Expected encoding.
    pub fn encoding(&self) -> ActionEncoding {
        self.config.encoding
    }

    /// The number of action channels, including the grip channel of discrete actions.
    pub fn action_dim(&self) -> usize {
        match self.config.encoding {
            ActionEncoding::Continuous => self.config.channels.len(),
            ActionEncoding::Discrete => self.config.channels.len() + 1,
        }
    }

    /// Decodes an action.
    ///
    /// An action of the other encoding is decoded by its own representation.
    pub fn decode(&self, act: &PickPlaceAct) -> DecodedAction {
        match act {
            PickPlaceAct::Continuous(v) => {
                if self.config.encoding != ActionEncoding::Continuous {
                    debug!("Continuous action given to a discrete task: {:?}", v);
                }
                DecodedAction {
                    controls: self.controls(|i| v.get(i).copied().unwrap_or(0.0)),
                    grip_toggle: false,
                }
            }
            PickPlaceAct::Discrete(v) => {
                if self.config.encoding != ActionEncoding::Discrete {
                    debug!("Discrete action given to a continuous task: {:?}", v);
                }
                let grip = self.config.channels.len();
                DecodedAction {
                    controls: self.controls(|i| v.get(i).map_or(0.0, |&x| x as f32 - 1.0)),
                    grip_toggle: v.get(grip) == Some(&1),
                }
            }
        }
    }

    fn controls(&self, input: impl Fn(usize) -> f32) -> Vec<(usize, f32)> {
        self.config
            .channels
            .iter()
            .enumerate()
            .map(|(i, &joint)| (joint, input(i)))
            .collect()
    }
}
