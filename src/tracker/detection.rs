//! Detection value passed from the detector through to tracker consumers.

use nalgebra::Point3;

use crate::tracker::identity::Identity;
use crate::tracker::rect::{BoundingBox, Centroid};

/// One detected object in one frame.
///
/// Detections are frame-scoped values. The pipeline enriches them by producing
/// new values ([`with_position`](Detection::with_position),
/// [`with_identity`](Detection::with_identity)) rather than mutating shared ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: BoundingBox,
    /// Class label produced by the detector
    pub class_label: String,
    /// Stable identity, set by the tracker
    pub identity: Option<Identity>,
    /// 3D position, set by the point picker and ignored by the tracker
    pub position: Option<Point3<f32>>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, class_label: impl Into<String>) -> Self {
        Self {
            bbox,
            class_label: class_label.into(),
            identity: None,
            position: None,
        }
    }

    /// Create a detection from TLBR coordinates.
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32, class_label: impl Into<String>) -> Self {
        Self::new(BoundingBox::from_tlbr(x1, y1, x2, y2), class_label)
    }

    #[inline]
    pub fn centroid(&self) -> Centroid {
        self.bbox.centroid()
    }

    pub fn with_identity(self, identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..self
        }
    }

    pub fn with_position(self, position: Option<Point3<f32>>) -> Self {
        Self { position, ..self }
    }

    /// Check that the detection can enter matching. Returns the reason it cannot.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.class_label.trim().is_empty() {
            return Err("class label is empty".to_string());
        }
        if !self.bbox.is_finite() {
            return Err(format!("bounding box is not finite: {:?}", self.bbox));
        }
        if self.bbox.w < 0.0 || self.bbox.h < 0.0 {
            return Err(format!("bounding box has negative size: {:?}", self.bbox));
        }
        if let Some(identity) = self.identity {
            return Err(format!("identity {identity} is already assigned"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrichment_produces_new_values() {
        let det = Detection::from_tlbr(0.0, 0.0, 10.0, 20.0, "car");
        let tracked = det
            .clone()
            .with_position(Some(Point3::new(1.0, 2.0, 3.0)))
            .with_identity(4);

        assert_eq!(det.identity, None);
        assert_eq!(det.position, None);
        assert_eq!(tracked.identity, Some(4));
        assert_eq!(tracked.position, Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(tracked.bbox, det.bbox);
        assert_eq!(tracked.centroid(), Centroid::new(5.0, 10.0));
    }

    #[test]
    fn test_check() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        assert!(Detection::new(bbox, "car").check().is_ok());
        assert!(Detection::new(bbox, " ").check().is_err());
        assert!(Detection::new(BoundingBox::new(0.0, 0.0, -1.0, 4.0), "car").check().is_err());
        assert!(Detection::new(BoundingBox::new(f32::NAN, 0.0, 1.0, 4.0), "car").check().is_err());
        assert!(Detection::new(bbox, "car").with_identity(1).check().is_err());
    }
}
