//! Constant-velocity Kalman filter over a 2D centroid, using ndarray and a nalgebra-based inverse.

use ndarray::{Array1, Array2, array};
use tracing::warn;

use crate::error::TrackError;
use crate::tracker::motion::{MotionModel, MotionModelFactory};
use crate::tracker::rect::Centroid;

/// Default scale of the process noise covariance (`q * I`).
pub const DEFAULT_PROCESS_NOISE: f64 = 0.03;

/// Filter parameters shared by every tracked object.
///
/// State is `[x, y, vx, vy]`, measurement is `[x, y]`. Position advances by
/// velocity once per frame; velocity is carried unchanged.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_noise: Array2<f64>,
    measurement_noise: Array2<f64>,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let ndim = 2;
        let mut motion_mat = Array2::eye(2 * ndim);
        for i in 0..ndim {
            motion_mat[[i, ndim + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((ndim, 2 * ndim));
        for i in 0..ndim {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            process_noise: Array2::<f64>::eye(2 * ndim) * DEFAULT_PROCESS_NOISE,
            measurement_noise: Array2::eye(ndim),
        }
    }

    /// Build a filter with process noise `scale * I`.
    pub fn with_process_noise(scale: f64) -> Result<Self, TrackError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(TrackError::Configuration(format!(
                "process noise scale must be a positive finite number, got {scale}"
            )));
        }
        let mut filter = Self::new();
        filter.process_noise = Array2::<f64>::eye(4) * scale;
        Ok(filter)
    }

    /// Seed the state at `measurement` with zero velocity and zero covariance.
    pub fn initiate(&self, measurement: &Centroid) -> (Array1<f64>, Array2<f64>) {
        let mean = array![measurement.x, measurement.y, 0.0, 0.0];
        let covariance = Array2::zeros((4, 4));
        (mean, covariance)
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_noise;

        (new_mean, new_covariance)
    }

    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_noise;

        (mean_proj, covariance_proj)
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: &Centroid,
    ) -> (Array1<f64>, Array2<f64>) {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let Some(s_inv) = invert_2x2(&projected_cov) else {
            warn!("singular innovation covariance, skipping correction");
            return (mean.clone(), covariance.clone());
        };

        let innovation = array![measurement.x, measurement.y] - projected_mean;

        // K = P * H^T * S^-1
        let pht = covariance.dot(&self.update_mat.t()); // 4x2
        let kalman_gain = pht.dot(&s_inv); // 4x2

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&self.update_mat).dot(covariance);

        (new_mean, new_covariance)
    }
}

/// Invert a 2x2 matrix using nalgebra (pure Rust).
fn invert_2x2(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix2::new(m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((2, 2), |(i, j)| inv[(i, j)]))
}

/// Per-object state driven by a shared [`KalmanFilter`] parameter set.
#[derive(Debug, Clone)]
pub struct KalmanMotion {
    filter: KalmanFilter,
    mean: Array1<f64>,
    covariance: Array2<f64>,
}

impl KalmanMotion {
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }
}

impl MotionModel for KalmanMotion {
    fn predict(&mut self) -> Centroid {
        let (mean, covariance) = self.filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.position()
    }

    fn correct(&mut self, measurement: &Centroid) {
        let (mean, covariance) = self.filter.update(&self.mean, &self.covariance, measurement);
        self.mean = mean;
        self.covariance = covariance;
    }

    fn position(&self) -> Centroid {
        Centroid::new(self.mean[0], self.mean[1])
    }

    fn velocity(&self) -> (f64, f64) {
        (self.mean[2], self.mean[3])
    }
}

impl MotionModelFactory for KalmanFilter {
    type Model = KalmanMotion;

    fn create(&self, initial: &Centroid) -> KalmanMotion {
        let (mean, covariance) = self.initiate(initial);
        KalmanMotion {
            filter: self.clone(),
            mean,
            covariance,
        }
    }
}
