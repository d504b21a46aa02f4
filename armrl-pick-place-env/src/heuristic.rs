//! Manual control producing the same actions as a learned policy.
use crate::{
    decoder::{ActionConfig, ActionEncoding},
    PickPlaceAct, PickPlaceEnv, PickPlaceObs,
};
use armrl_core::Policy;
use std::collections::VecDeque;

/// State of the control keys in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualInput {
    /// Turn the first channel backward.
    pub left: bool,

    /// Turn the first channel forward.
    pub right: bool,

    /// Turn the vertical channel forward.
    pub up: bool,

    /// Turn the vertical channel backward.
    pub down: bool,

    /// Grip key. A toggle is requested when it goes down, not while it is held.
    pub grip: bool,

    /// Action channel driven by the vertical axis while a joint-select key is held.
    /// Channel 1 otherwise.
    pub select: Option<usize>,
}

impl ManualInput {
    /// No key pressed.
    pub fn idle() -> Self {
        Self::default()
    }

    fn horizontal(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    fn vertical(&self) -> i32 {
        self.up as i32 - self.down as i32
    }
}

/// Source of [`ManualInput`], e.g., a keyboard.
pub trait InputSource {
    /// Returns the key state of the current step.
    fn poll(&mut self) -> ManualInput;
}

/// Replays a fixed sequence of inputs, then stays idle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    inputs: VecDeque<ManualInput>,
}

impl ScriptedInput {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `input` held for `n` steps.
    pub fn hold(mut self, input: ManualInput, n: usize) -> Self {
        self.inputs.extend(std::iter::repeat(input).take(n));
        self
    }

    /// Appends a single press of the grip key, followed by a release.
    pub fn press_grip(self) -> Self {
        self.hold(
            ManualInput {
                grip: true,
                ..ManualInput::idle()
            },
            1,
        )
        .hold(ManualInput::idle(), 1)
    }

    /// The number of remaining inputs.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> ManualInput {
        self.inputs.pop_front().unwrap_or_default()
    }
}

/// Turns manual input into [`PickPlaceAct`].
///
/// The horizontal axis drives action channel 0 and the vertical axis drives
/// channel 1, or the selected channel. Discrete actions carry the grip in
/// their grip channel. Continuous actions cannot, so a driver should check
/// [`Heuristic::grip_pressed`] after sampling and call
/// [`PickPlaceEnv::request_grip`].
pub struct Heuristic<S: InputSource> {
    source: S,
    encoding: ActionEncoding,
    n_channels: usize,
    grip_down: bool,
    grip_pressed: bool,
}

impl<S: InputSource> Heuristic<S> {
    /// Creates a policy producing actions for `config`.
    pub fn new(source: S, config: &ActionConfig) -> Self {
        Self {
            source,
            encoding: config.encoding,
            n_channels: config.channels.len(),
            grip_down: false,
            grip_pressed: false,
        }
    }

    /// Returns `true` if the grip key went down in the last sample.
    pub fn grip_pressed(&self) -> bool {
        self.grip_pressed
    }

    /// The input source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn axes(&self, input: &ManualInput) -> Vec<i32> {
        let mut axes = vec![0; self.n_channels];
        if let Some(x) = axes.get_mut(0) {
            *x = input.horizontal();
        }
        if let Some(y) = axes.get_mut(input.select.unwrap_or(1)) {
            *y = input.vertical();
        }
        axes
    }
}

impl<S: InputSource> Policy<PickPlaceEnv> for Heuristic<S> {
    fn sample(&mut self, _obs: &PickPlaceObs) -> PickPlaceAct {
        let input = self.source.poll();
        self.grip_pressed = input.grip && !self.grip_down;
        self.grip_down = input.grip;

        let axes = self.axes(&input);
        match self.encoding {
            ActionEncoding::Continuous => {
                PickPlaceAct::Continuous(axes.into_iter().map(|a| a as f32).collect())
            }
            ActionEncoding::Discrete => {
                let mut act: Vec<i32> = axes.into_iter().map(|a| a + 1).collect();
                act.push(self.grip_pressed as i32);
                PickPlaceAct::Discrete(act)
            }
        }
    }
}
