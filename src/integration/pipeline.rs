//! DetectionPipeline for combining detection, point picking and tracking.

use crate::error::{PipelineError, TrackError};
use crate::tracker::{CentroidTracker, Detection, KalmanFilter, MotionModelFactory, TrackerConfig};

use super::{DetectionSource, PointPicker};

/// Runs each frame through detector, point picker and tracker, in that order.
///
/// The pipeline keeps no per-frame state of its own; only the tracker it owns
/// carries state between frames.
pub struct DetectionPipeline<D, P, F = KalmanFilter>
where
    D: DetectionSource,
    P: PointPicker,
    F: MotionModelFactory,
{
    detector: D,
    point_picker: P,
    tracker: CentroidTracker<F>,
}

impl<D: DetectionSource, P: PointPicker> DetectionPipeline<D, P, KalmanFilter> {
    /// Create a new pipeline with a default-motion tracker built from `config`.
    pub fn new(detector: D, point_picker: P, config: TrackerConfig) -> Result<Self, TrackError> {
        Ok(Self::with_tracker(
            detector,
            point_picker,
            CentroidTracker::new(config)?,
        ))
    }

    /// Create a new pipeline with default tracker configuration.
    pub fn with_default_config(detector: D, point_picker: P) -> Result<Self, TrackError> {
        Self::new(detector, point_picker, TrackerConfig::default())
    }
}

impl<D, P, F> DetectionPipeline<D, P, F>
where
    D: DetectionSource,
    P: PointPicker,
    F: MotionModelFactory,
{
    pub fn with_tracker(detector: D, point_picker: P, tracker: CentroidTracker<F>) -> Self {
        Self {
            detector,
            point_picker,
            tracker,
        }
    }

    /// Process a single frame and return its detections with positions and
    /// identities attached.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, PipelineError<D::Error, P::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detect)?;

        let positions = self
            .point_picker
            .pick(input, width, height, &detections)
            .map_err(PipelineError::Pick)?;
        if positions.len() != detections.len() {
            return Err(PipelineError::PositionCount {
                expected: detections.len(),
                got: positions.len(),
            });
        }

        let located = detections
            .into_iter()
            .zip(positions)
            .map(|(det, position)| det.with_position(position))
            .collect();

        Ok(self.tracker.update(located)?)
    }

    /// Process frames in order, stopping at the first failure.
    pub fn process_frames<'a, I>(
        &mut self,
        frames: I,
    ) -> Result<Vec<Vec<Detection>>, PipelineError<D::Error, P::Error>>
    where
        I: IntoIterator<Item = (&'a [u8], u32, u32)>,
    {
        frames
            .into_iter()
            .map(|(input, width, height)| self.process_frame(input, width, height))
            .collect()
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn point_picker(&self) -> &P {
        &self.point_picker
    }

    pub fn point_picker_mut(&mut self) -> &mut P {
        &mut self.point_picker
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &CentroidTracker<F> {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::NoDepth;
    use crate::tracker::BoundingBox;
    use nalgebra::Point3;
    use std::collections::VecDeque;

    struct ScriptedDetector {
        frames: VecDeque<Vec<Detection>>,
    }

    impl DetectionSource for ScriptedDetector {
        type Error = String;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, Self::Error> {
            self.frames.pop_front().ok_or_else(|| "out of frames".to_string())
        }
    }

    /// Lifts the centroid onto a plane at a fixed depth.
    struct FlatPicker {
        depth: f32,
        calls: usize,
    }

    impl PointPicker for FlatPicker {
        type Error = std::convert::Infallible;

        fn pick(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
            detections: &[Detection],
        ) -> Result<Vec<Option<Point3<f32>>>, Self::Error> {
            self.calls += 1;
            Ok(detections
                .iter()
                .map(|d| {
                    let c = d.centroid();
                    Some(Point3::new(c.x as f32, c.y as f32, self.depth))
                })
                .collect())
        }
    }

    struct ShortPicker;

    impl PointPicker for ShortPicker {
        type Error = std::convert::Infallible;

        fn pick(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
            _detections: &[Detection],
        ) -> Result<Vec<Option<Point3<f32>>>, Self::Error> {
            Ok(Vec::new())
        }
    }

    fn car(cx: f32, cy: f32) -> Detection {
        Detection::new(BoundingBox::from_center(cx, cy, 20.0, 20.0), "car")
    }

    fn scripted(frames: Vec<Vec<Detection>>) -> ScriptedDetector {
        ScriptedDetector {
            frames: frames.into(),
        }
    }

    #[test]
    fn test_detection_pipeline() {
        let detector = scripted(vec![vec![car(50.0, 50.0)], vec![car(53.0, 51.0)]]);
        let picker = FlatPicker {
            depth: 7.5,
            calls: 0,
        };
        let mut pipeline = DetectionPipeline::with_default_config(detector, picker).unwrap();

        let first = pipeline.process_frame(&[], 640, 480).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].identity, Some(0));
        assert_eq!(first[0].position, Some(Point3::new(50.0, 50.0, 7.5)));

        let second = pipeline.process_frame(&[], 640, 480).unwrap();
        assert_eq!(second[0].identity, Some(0));
        assert_eq!(pipeline.point_picker().calls, 2);
        assert_eq!(pipeline.tracker().frame_count(), 2);
    }

    #[test]
    fn test_process_frames() {
        let detector = scripted(vec![
            vec![car(50.0, 50.0), car(300.0, 50.0)],
            vec![car(52.0, 50.0)],
            vec![car(301.0, 50.0), car(54.0, 50.0)],
        ]);
        let mut pipeline = DetectionPipeline::with_default_config(detector, NoDepth).unwrap();

        let frame: &[u8] = &[];
        let out = pipeline
            .process_frames(std::iter::repeat((frame, 640, 480)).take(3))
            .unwrap();

        let ids: Vec<Vec<Option<u64>>> = out
            .iter()
            .map(|f| f.iter().map(|d| d.identity).collect())
            .collect();
        assert_eq!(
            ids,
            vec![vec![Some(0), Some(1)], vec![Some(0)], vec![Some(1), Some(0)]]
        );
        assert!(out.iter().flatten().all(|d| d.position.is_none()));
    }

    #[test]
    fn test_detector_error_stops_before_tracking() {
        let detector = scripted(vec![vec![car(50.0, 50.0)]]);
        let mut pipeline = DetectionPipeline::with_default_config(detector, NoDepth).unwrap();

        pipeline.process_frame(&[], 640, 480).unwrap();
        let err = pipeline.process_frame(&[], 640, 480).unwrap_err();
        assert!(matches!(err, PipelineError::Detect(ref msg) if msg == "out of frames"));
        assert_eq!(pipeline.tracker().frame_count(), 1);
    }

    #[test]
    fn test_position_count_mismatch() {
        let detector = scripted(vec![vec![car(50.0, 50.0)]]);
        let mut pipeline = DetectionPipeline::with_default_config(detector, ShortPicker).unwrap();

        let err = pipeline.process_frame(&[], 640, 480).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::PositionCount {
                expected: 1,
                got: 0
            }
        ));
        assert!(pipeline.tracker().is_empty());
    }

    #[test]
    fn test_tracker_error_is_forwarded() {
        let detector = scripted(vec![vec![Detection::new(
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            "",
        )]]);
        let mut pipeline = DetectionPipeline::with_default_config(detector, NoDepth).unwrap();

        let err = pipeline.process_frame(&[], 640, 480).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Track(TrackError::InvalidDetection { index: 0, .. })
        ));
    }
}
