//! Class-aware centroid tracking.
//!
//! Detections from an external detector are matched frame to frame against
//! constant-velocity Kalman predictions and enriched with stable integer
//! identities. See [`CentroidTracker`] for the per-frame algorithm and
//! [`DetectionPipeline`] for wiring a detector and point picker in front of it.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{PipelineError, TrackError};
pub use integration::{
    DetectionBuilder, DetectionPipeline, DetectionSource, NoDepth, PointPicker,
};
pub use tracker::{
    BoundingBox, Centroid, CentroidTracker, Detection, Distance, Identity, KalmanFilter,
    MotionModel, MotionModelFactory, ObjectInstance, TrackState, TrackerConfig,
};
