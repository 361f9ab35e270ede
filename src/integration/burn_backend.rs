//! Burn inference backend for object detection.
//!
//! `BurnDetector` implements `DetectionSource` for detection models built with
//! the Burn framework. Raw class indices are resolved to labels through the
//! class-name table the detector is built with.
//!
//! # Example
//!
//! ```ignore
//! use centroid_track::integration::{BurnDetector, BurnModel};
//! use burn::backend::NdArray;
//!
//! struct MyYoloModel { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyYoloModel {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<RawDetection> {
//!         // Run inference
//!     }
//! }
//!
//! let model = MyYoloModel::load("model.bin");
//! let names = vec!["car".to_string(), "person".to_string()];
//! let detector = BurnDetector::new(model, Default::default(), names);
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use thiserror::Error;
use tracing::trace;

use super::{DetectionBuilder, DetectionSource};
use crate::tracker::Detection;

/// Error type for Burn detection failures.
#[derive(Debug, Clone, Error)]
pub enum BurnDetectorError {
    /// Input image has invalid dimensions.
    #[error("invalid input dimensions: expected {expected:?}, got {got:?}")]
    InvalidInputDimensions {
        expected: (u32, u32, u32),
        got: (u32, u32, u32),
    },
    /// Preprocessing failed.
    #[error("preprocessing error: {0}")]
    PreprocessingError(String),
}

/// Raw detection output from the model.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Bounding box: [x1, y1, x2, y2] or [cx, cy, w, h] depending on model
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Index into the detector's class-name table
    pub class_id: usize,
}

/// Trait for Burn-based detection models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on an input tensor of shape [batch, channels, height, width].
    fn forward(&self, input: Tensor<B, 4>) -> Vec<RawDetection>;

    /// Get the expected input size (channels, height, width).
    fn input_size(&self) -> (u32, u32, u32) {
        (3, 608, 608)
    }

    /// Whether bbox output is in XYWH format (vs TLBR).
    fn bbox_is_xywh(&self) -> bool {
        true
    }
}

/// Burn-based object detector implementing `DetectionSource`.
pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
    class_names: Vec<String>,
    conf_threshold: f32,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    /// Create a new Burn detector with the given model, device and class-name table.
    pub fn new(model: M, device: B::Device, class_names: Vec<String>) -> Self {
        Self {
            model,
            device,
            class_names,
            conf_threshold: 0.25,
        }
    }

    /// Set the confidence threshold for filtering detections.
    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Convert raw image bytes to a normalized [1, C, H, W] tensor.
    pub fn preprocess(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let (channels, target_h, target_w) = self.model.input_size();
        let expected_len = (width * height * channels) as usize;

        if input.len() != expected_len {
            return Err(BurnDetectorError::InvalidInputDimensions {
                expected: (channels, height, width),
                got: (channels, height, input.len() as u32 / (height * channels).max(1)),
            });
        }

        if height != target_h || width != target_w {
            return Err(BurnDetectorError::PreprocessingError(format!(
                "input size {}x{} doesn't match model size {}x{}",
                width, height, target_w, target_h
            )));
        }

        let data: Vec<f32> = input.iter().map(|&x| x as f32 / 255.0).collect();

        Ok(
            Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
                1,
                channels as usize,
                height as usize,
                width as usize,
            ]),
        )
    }

    /// Convert raw model outputs to labelled detections.
    ///
    /// Outputs below the confidence threshold or with a class index outside
    /// the class-name table are dropped.
    fn postprocess(&self, raw_detections: Vec<RawDetection>) -> Vec<Detection> {
        raw_detections
            .into_iter()
            .filter(|d| d.score >= self.conf_threshold)
            .filter_map(|d| {
                let Some(label) = self.class_names.get(d.class_id) else {
                    trace!(class_id = d.class_id, "dropping detection with unknown class");
                    return None;
                };
                let builder = DetectionBuilder::new().class_label(label.as_str());
                let [a, b, c, e] = d.bbox;
                Some(if self.model.bbox_is_xywh() {
                    builder.xywh(a, b, c, e).build()
                } else {
                    builder.tlbr(a, b, c, e).build()
                })
            })
            .collect()
    }
}

impl<B: Backend, M: BurnModel<B>> DetectionSource for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error> {
        let tensor = self.preprocess(input, width, height)?;
        let raw_detections = self.model.forward(tensor);
        Ok(self.postprocess(raw_detections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    struct FixedModel {
        outputs: Vec<RawDetection>,
        xywh: bool,
    }

    impl BurnModel<NdArray> for FixedModel {
        fn forward(&self, _input: Tensor<NdArray, 4>) -> Vec<RawDetection> {
            self.outputs.clone()
        }

        fn bbox_is_xywh(&self) -> bool {
            self.xywh
        }
    }

    fn detector(xywh: bool) -> BurnDetector<NdArray, FixedModel> {
        let model = FixedModel {
            outputs: Vec::new(),
            xywh,
        };
        BurnDetector::new(
            model,
            Default::default(),
            vec!["car".to_string(), "person".to_string()],
        )
        .with_conf_threshold(0.5)
    }

    fn raw(bbox: [f32; 4], score: f32, class_id: usize) -> RawDetection {
        RawDetection {
            bbox,
            score,
            class_id,
        }
    }

    #[test]
    fn test_postprocess_labels_and_filters() {
        let detections = detector(false).postprocess(vec![
            raw([10.0, 20.0, 50.0, 80.0], 0.9, 1),
            raw([0.0, 0.0, 5.0, 5.0], 0.3, 0),
            raw([0.0, 0.0, 5.0, 5.0], 0.95, 7),
            raw([100.0, 100.0, 120.0, 140.0], 0.5, 0),
        ]);

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].class_label, "person");
        assert_eq!(detections[0].bbox.to_tlwh(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(detections[1].class_label, "car");
        assert!(detections.iter().all(|d| d.identity.is_none()));
    }

    #[test]
    fn test_postprocess_xywh_boxes() {
        let detections = detector(true).postprocess(vec![raw([30.0, 50.0, 40.0, 60.0], 0.8, 0)]);
        assert_eq!(detections[0].bbox.to_tlwh(), [10.0, 20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_preprocess_rejects_wrong_length() {
        let result = detector(true).preprocess(&[0u8; 10], 608, 608);
        assert!(matches!(
            result,
            Err(BurnDetectorError::InvalidInputDimensions { .. })
        ));
    }
}
