//! Motion model abstraction used by the tracker.

use crate::tracker::rect::Centroid;

/// Per-object state estimator.
///
/// The tracker calls [`predict`](MotionModel::predict) exactly once per frame
/// for every live object before any matching, then
/// [`correct`](MotionModel::correct) only for objects matched that frame.
/// Correcting without a prior predict in the same frame does not panic but
/// fuses into a stale state.
pub trait MotionModel {
    /// Advance one frame and return the predicted position.
    fn predict(&mut self) -> Centroid;

    /// Fuse an observed position into the current estimate.
    fn correct(&mut self, measurement: &Centroid);

    /// Current position estimate.
    fn position(&self) -> Centroid;

    /// Current velocity estimate in pixels per frame.
    fn velocity(&self) -> (f64, f64);
}

/// Creates a fresh motion model the first time an identity is minted.
pub trait MotionModelFactory {
    type Model: MotionModel;

    /// Create a model at `initial` with zero velocity.
    fn create(&self, initial: &Centroid) -> Self::Model;
}
