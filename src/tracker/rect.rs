use nalgebra::Point2;

/// 2D centre point of a bounding box or of a predicted state.
pub type Centroid = Point2<f64>;

/// Axis-aligned bounding box in frame pixel coordinates.
///
/// Stored as TLWH: top-left x, top-left y, width, height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub w: f32,
    /// Height of the bounding box
    pub h: f32,
}

impl BoundingBox {
    /// Create a new box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a box from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Create a box of the given size centred on `(cx, cy)`.
    #[inline]
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x: cx - w / 2.0,
            y: cy - h / 2.0,
            w,
            h,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.w, self.y + self.h]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Centre point of the box.
    #[inline]
    pub fn centroid(&self) -> Centroid {
        Centroid::new(
            self.x as f64 + self.w as f64 / 2.0,
            self.y as f64 + self.h as f64 / 2.0,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// Straight-line distance between two centroids.
#[inline]
pub fn centroid_distance(a: &Centroid, b: &Centroid) -> f64 {
    nalgebra::distance(a, b)
}

/// Metric used to compare a predicted centroid with a detection centroid.
#[derive(Debug, Clone, Copy, Default)]
pub enum Distance {
    #[default]
    Euclidean,
    /// Sum of absolute axis differences.
    Manhattan,
    /// Largest absolute axis difference.
    Chebyshev,
    /// Caller-supplied metric.
    Custom(fn(&Centroid, &Centroid) -> f64),
}

impl Distance {
    pub fn between(&self, a: &Centroid, b: &Centroid) -> f64 {
        match self {
            Self::Euclidean => centroid_distance(a, b),
            Self::Manhattan => (a - b).abs().sum(),
            Self::Chebyshev => (a - b).amax(),
            Self::Custom(f) => f(a, b),
        }
    }
}
