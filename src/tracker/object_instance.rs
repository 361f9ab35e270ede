//! Tracker record for a single identity.

use crate::tracker::detection::Detection;
use crate::tracker::motion::MotionModel;
use crate::tracker::rect::Centroid;

/// Motion state, most recent matched detection and age of one identity.
#[derive(Debug, Clone)]
pub struct ObjectInstance<M> {
    motion: M,
    last_detection: Detection,
    /// Frames since the identity was last matched (see [`CentroidTracker`](crate::CentroidTracker)).
    age: u32,
}

impl<M: MotionModel> ObjectInstance<M> {
    pub(crate) fn new(motion: M, detection: Detection) -> Self {
        Self {
            motion,
            last_detection: detection,
            age: 0,
        }
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    pub fn last_detection(&self) -> &Detection {
        &self.last_detection
    }

    pub fn class_label(&self) -> &str {
        &self.last_detection.class_label
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub(crate) fn predict(&mut self) -> Centroid {
        self.motion.predict()
    }

    /// Fuse a matched detection and reset the age.
    pub(crate) fn correct(&mut self, detection: Detection) {
        self.motion.correct(&detection.centroid());
        self.last_detection = detection;
        self.age = 0;
    }

    pub(crate) fn advance_age(&mut self) {
        self.age += 1;
    }
}
