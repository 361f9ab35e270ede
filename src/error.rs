//! Error types for the tracker and the detection pipeline.

use thiserror::Error;

/// Errors raised by the identity tracker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    /// A detection was rejected before matching. Tracker state is unchanged.
    #[error("invalid detection at index {index}: {reason}")]
    InvalidDetection { index: usize, reason: String },

    /// The frame could need more new identities than the counter has left.
    /// Tracker state is unchanged.
    #[error("identity space exhausted: frame has {detections} detections, next identity is {next:?}")]
    IdentitiesExhausted {
        detections: usize,
        next: Option<u64>,
    },

    /// A tracker or motion model could not be built from the given settings.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Errors raised while running a frame through the detection pipeline.
#[derive(Debug, Error)]
pub enum PipelineError<D, P> {
    #[error("detection failed: {0}")]
    Detect(D),

    #[error("point picking failed: {0}")]
    Pick(P),

    /// The point picker must return exactly one entry per detection.
    #[error("point picker returned {got} positions for {expected} detections")]
    PositionCount { expected: usize, got: usize },

    #[error(transparent)]
    Track(#[from] TrackError),
}
