//! Types and traits for recording environment metrics.
//!
//! Environments return a [`Record`] next to every [`Step`](crate::Step), typically the
//! reward breakdown of that step. Recorders collect them:
//!
//! * [`BufferedRecorder`] - keeps records in memory, e.g., for inspecting a rollout
//! * [`NullRecorder`] - discards all records
//!
//! ```rust
//! use armrl_core::record::{BufferedRecorder, Record, RecordValue, Recorder};
//!
//! let mut recorder = BufferedRecorder::new();
//! let mut record = Record::empty();
//! record.insert("reward", RecordValue::Scalar(-0.01));
//! recorder.write(record);
//!
//! assert_eq!(recorder.len(), 1);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
