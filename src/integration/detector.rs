//! Traits for the collaborators that run ahead of the tracker.

use nalgebra::Point3;

use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the tracker.
/// Returned detections must carry a class label and no identity; their order
/// does not matter.
///
/// # Example
///
/// ```ignore
/// use centroid_track::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Depth estimation and 3D point picking for a frame's detections.
///
/// Implementations typically estimate a depth map once per frame and then
/// back-project a point inside each bounding box through the camera
/// intrinsics. The tracker never reads the result.
pub trait PointPicker {
    type Error;

    /// Return one entry per detection, in the same order. `None` marks a
    /// detection whose position could not be recovered.
    fn pick(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        detections: &[Detection],
    ) -> Result<Vec<Option<Point3<f32>>>, Self::Error>;
}

/// Point picker for pipelines without depth; leaves every position unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDepth;

impl PointPicker for NoDepth {
    type Error = std::convert::Infallible;

    fn pick(
        &mut self,
        _input: &[u8],
        _width: u32,
        _height: u32,
        detections: &[Detection],
    ) -> Result<Vec<Option<Point3<f32>>>, Self::Error> {
        Ok(vec![None; detections.len()])
    }
}
