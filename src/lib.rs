//! Squat repetition counting from 2D pose keypoints.
//!
//! Each detection's left knee angle is classified into a [`Phase`], which drives
//! a per-entity state machine held in a [`StateStore`]. [`FrameProcessor`] ties
//! these together for one frame of detections at a time.

mod angle;
mod error;
mod frame;
mod phase;
mod pose;
mod state;
mod store;

pub use angle::angle;
pub use error::Error;
pub use frame::{
    DetectionBatch, FrameProcessor, Labels, Prediction, ProcessedFrame, ProcessorConfig,
    StateRecord,
};
pub use phase::{classify, Phase, PhaseThresholds};
pub use pose::{KeypointKind, Keypoints, Point2D, NUM_KEYPOINTS};
pub use state::{MovementState, TrackedEntityState, Transition};
pub use store::{EntityId, StateStore};
