mod centroid_tracker;
mod detection;
mod identity;
mod kalman_filter;
mod matching;
mod motion;
mod object_instance;
mod rect;
mod track_state;

pub use centroid_tracker::{CentroidTracker, TrackerConfig};
pub use detection::Detection;
pub use identity::{Identity, IdentityCounter};
pub use kalman_filter::{DEFAULT_PROCESS_NOISE, KalmanFilter, KalmanMotion};
pub use matching::{Candidate, centroid_distance_matrix, greedy_assignment};
pub use motion::{MotionModel, MotionModelFactory};
pub use object_instance::ObjectInstance;
pub use rect::{BoundingBox, Centroid, Distance, centroid_distance};
pub use track_state::TrackState;
