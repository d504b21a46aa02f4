//! Action for [`PickPlaceEnv`](crate::PickPlaceEnv).
use armrl_core::Act;

/// Action for [`PickPlaceEnv`](crate::PickPlaceEnv).
///
/// Which variant a task expects is set by
/// [`ActionConfig::encoding`](crate::ActionConfig); see
/// [`ActionDecoder`](crate::ActionDecoder) for how each one drives the arm.
#[derive(Debug, Clone, PartialEq)]
pub enum PickPlaceAct {
    /// Joint inputs, nominally in `[-1, 1]`.
    Continuous(Vec<f32>),

    /// Joint channels in `{0, 1, 2}` followed by a grip channel in `{0, 1}`.
    Discrete(Vec<i32>),
}

impl PickPlaceAct {
    /// Action leaving every joint still and not gripping.
    pub fn idle_continuous(n_channels: usize) -> Self {
        Self::Continuous(vec![0.0; n_channels])
    }

    /// Action leaving every joint still and not gripping.
    pub fn idle_discrete(n_channels: usize) -> Self {
        Self::Discrete([vec![1; n_channels], vec![0]].concat())
    }
}

impl Act for PickPlaceAct {
    fn len(&self) -> usize {
        match self {
            Self::Continuous(v) => v.len(),
            Self::Discrete(v) => v.len(),
        }
    }
}

impl From<Vec<f32>> for PickPlaceAct {
    fn from(v: Vec<f32>) -> Self {
        Self::Continuous(v)
    }
}

impl From<Vec<i32>> for PickPlaceAct {
    fn from(v: Vec<i32>) -> Self {
        Self::Discrete(v)
    }
}
