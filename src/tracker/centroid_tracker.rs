//! Centroid tracker: greedy, class-aware matching of detections to predicted identities.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::error::TrackError;
use crate::tracker::detection::Detection;
use crate::tracker::identity::{Identity, IdentityCounter};
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, Candidate};
use crate::tracker::motion::MotionModelFactory;
use crate::tracker::object_instance::ObjectInstance;
use crate::tracker::rect::{Centroid, Distance};
use crate::tracker::track_state::TrackState;

/// Configuration for the [`CentroidTracker`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Metric between a predicted centroid and a detection centroid.
    pub distance: Distance,
    /// Only match detections whose class label equals the identity's last one.
    pub class_aware: bool,
    /// Instances whose age exceeds this are retired.
    pub pruning_age: u32,
    /// Matches require a distance strictly below this.
    pub dist_thresh: f64,
    /// First identity handed out.
    pub first_identity: Identity,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            distance: Distance::Euclidean,
            class_aware: true,
            pruning_age: 50,
            dist_thresh: 500.0,
            first_identity: 0,
        }
    }
}

impl TrackerConfig {
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_class_aware(mut self, class_aware: bool) -> Self {
        self.class_aware = class_aware;
        self
    }

    pub fn with_pruning_age(mut self, pruning_age: u32) -> Self {
        self.pruning_age = pruning_age;
        self
    }

    pub fn with_dist_thresh(mut self, dist_thresh: f64) -> Self {
        self.dist_thresh = dist_thresh;
        self
    }

    pub fn with_first_identity(mut self, first_identity: Identity) -> Self {
        self.first_identity = first_identity;
        self
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.pruning_age == 0 {
            return Err(TrackError::Configuration(
                "pruning_age must be positive".to_string(),
            ));
        }
        if !(self.dist_thresh.is_finite() && self.dist_thresh > 0.0) {
            return Err(TrackError::Configuration(format!(
                "dist_thresh must be a positive finite number, got {}",
                self.dist_thresh
            )));
        }
        Ok(())
    }
}

/// Assigns stable identities to per-frame detections.
///
/// Each call to [`update`](CentroidTracker::update) runs one frame:
///
/// 1. every live instance predicts its next centroid;
/// 2. identities that were on screen last frame are matched first, by
///    repeatedly taking the globally closest (identity, detection) pair
///    strictly below `dist_thresh`;
/// 3. off-screen identities are matched the same way against what is left;
/// 4. each remaining detection gets a new identity at age 0;
/// 5. every other instance ages by one, so a matched instance ends at 1;
/// 6. instances older than `pruning_age` are retired for good;
/// 7. identities seen this frame become on screen, the rest off screen.
///
/// Equal distances are won by the lowest identity, then the lowest
/// detection index.
pub struct CentroidTracker<F: MotionModelFactory = KalmanFilter> {
    on_screen: BTreeSet<Identity>,
    off_screen: BTreeSet<Identity>,
    instances: BTreeMap<Identity, ObjectInstance<F::Model>>,
    identities: IdentityCounter,
    frame_count: u64,
    config: TrackerConfig,
    motion_factory: F,
}

impl CentroidTracker<KalmanFilter> {
    /// Create a tracker with the default constant-velocity Kalman motion model.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackError> {
        Self::with_motion_model(config, KalmanFilter::default())
    }
}

impl<F: MotionModelFactory> CentroidTracker<F> {
    pub fn with_motion_model(config: TrackerConfig, motion_factory: F) -> Result<Self, TrackError> {
        config.validate()?;
        Ok(Self {
            on_screen: BTreeSet::new(),
            off_screen: BTreeSet::new(),
            instances: BTreeMap::new(),
            identities: IdentityCounter::starting_at(config.first_identity),
            frame_count: 0,
            config,
            motion_factory,
        })
    }

    /// Run one frame and return the detections with identities attached.
    ///
    /// Detections are validated before any state changes; on error the
    /// tracker is left exactly as it was.
    pub fn update(&mut self, detections: Vec<Detection>) -> Result<Vec<Detection>, TrackError> {
        for (index, det) in detections.iter().enumerate() {
            det.check()
                .map_err(|reason| TrackError::InvalidDetection { index, reason })?;
        }
        // Every detection might need a fresh identity
        if !self.identities.has_room_for(detections.len()) {
            return Err(TrackError::IdentitiesExhausted {
                detections: detections.len(),
                next: self.identities.peek(),
            });
        }

        self.frame_count += 1;

        // Step 1: Predict every known identity, on or off screen
        let predicted: BTreeMap<Identity, Centroid> = self
            .instances
            .iter_mut()
            .map(|(&id, inst)| (id, inst.predict()))
            .collect();

        // Step 2 and 3: On-screen identities get first pick
        let mut assigned: Vec<Option<Identity>> = vec![None; detections.len()];
        let det_candidates: Vec<Candidate<'_>> = detections
            .iter()
            .map(|d| Candidate {
                predicted: d.centroid(),
                class_label: &d.class_label,
            })
            .collect();
        let matched_on =
            self.assign_phase(&self.on_screen, &predicted, &det_candidates, &mut assigned);
        let matched_off =
            self.assign_phase(&self.off_screen, &predicted, &det_candidates, &mut assigned);

        for (det, id) in detections.iter().zip(&assigned) {
            if let Some(id) = *id {
                if let Some(inst) = self.instances.get_mut(&id) {
                    inst.correct(det.clone().with_identity(id));
                }
            }
        }

        // Step 5 runs before minting so new instances stay at age 0
        for inst in self.instances.values_mut() {
            inst.advance_age();
        }

        // Step 4: Mint identities for whatever is left
        let mut minted = 0;
        let mut tracked = Vec::with_capacity(detections.len());
        for (det, id) in detections.into_iter().zip(assigned) {
            let det = match id {
                Some(id) => det.with_identity(id),
                None => {
                    // Cannot fail, room was checked before any state changed
                    let id = self.identities.next_identity().ok_or(
                        TrackError::IdentitiesExhausted {
                            detections: minted + 1,
                            next: None,
                        },
                    )?;
                    let det = det.with_identity(id);
                    let motion = self.motion_factory.create(&det.centroid());
                    self.instances.insert(id, ObjectInstance::new(motion, det.clone()));
                    trace!(identity = id, class = %det.class_label, "new identity");
                    minted += 1;
                    det
                }
            };
            tracked.push(det);
        }

        // Step 6: Prune
        let pruning_age = self.config.pruning_age;
        let before = self.instances.len();
        self.instances.retain(|&id, inst| {
            let keep = inst.age() <= pruning_age;
            if !keep {
                debug!(identity = id, age = inst.age(), "pruning identity");
            }
            keep
        });
        let pruned = before - self.instances.len();

        // Step 7: Recompute the partition
        self.on_screen = tracked.iter().filter_map(|d| d.identity).collect();
        self.off_screen = self
            .instances
            .keys()
            .filter(|&id| !self.on_screen.contains(id))
            .copied()
            .collect();

        debug!(
            frame = self.frame_count,
            detections = tracked.len(),
            matched_on,
            matched_off,
            minted,
            pruned,
            live = self.instances.len(),
            "tracker step"
        );

        Ok(tracked)
    }

    /// Greedily match one group of identities against the detections not yet
    /// in `assigned`. Returns the number of matches made.
    fn assign_phase(
        &self,
        phase: &BTreeSet<Identity>,
        predicted: &BTreeMap<Identity, Centroid>,
        detections: &[Candidate<'_>],
        assigned: &mut [Option<Identity>],
    ) -> usize {
        if phase.is_empty() || detections.is_empty() {
            return 0;
        }

        // BTreeSet iteration is ascending, which fixes the tie-break order
        let ids: Vec<Identity> = phase.iter().copied().collect();
        let tracks: Vec<Candidate<'_>> = ids
            .iter()
            .filter_map(|id| {
                let inst = self.instances.get(id)?;
                Some(Candidate {
                    predicted: *predicted.get(id)?,
                    class_label: inst.class_label(),
                })
            })
            .collect();
        debug_assert_eq!(tracks.len(), ids.len());

        let dists = matching::centroid_distance_matrix(
            &tracks,
            detections,
            self.config.distance,
            self.config.class_aware,
        );
        let taken: Vec<bool> = assigned.iter().map(Option::is_some).collect();
        let matches = matching::greedy_assignment(&dists, self.config.dist_thresh, &taken);

        for &(row, col) in &matches {
            trace!(identity = ids[row], detection = col, distance = dists[[row, col]], "matched");
            assigned[col] = Some(ids[row]);
        }
        matches.len()
    }

    /// Identities matched in the most recent frame.
    pub fn on_screen(&self) -> &BTreeSet<Identity> {
        &self.on_screen
    }

    /// Live identities not matched in the most recent frame.
    pub fn off_screen(&self) -> &BTreeSet<Identity> {
        &self.off_screen
    }

    pub fn instance(&self, id: Identity) -> Option<&ObjectInstance<F::Model>> {
        self.instances.get(&id)
    }

    /// All live instances in ascending identity order.
    pub fn instances(&self) -> impl Iterator<Item = (Identity, &ObjectInstance<F::Model>)> {
        self.instances.iter().map(|(&id, inst)| (id, inst))
    }

    pub fn state_of(&self, id: Identity) -> Option<TrackState> {
        if self.on_screen.contains(&id) {
            Some(TrackState::OnScreen)
        } else if self.off_screen.contains(&id) {
            Some(TrackState::OffScreen)
        } else {
            None
        }
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The identity the next new object will receive, `None` once exhausted.
    pub fn upcoming_identity(&self) -> Option<Identity> {
        self.identities.peek()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn motion_factory(&self) -> &F {
        &self.motion_factory
    }
}
