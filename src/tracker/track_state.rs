/// Visibility of a live identity as of the most recent frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackState {
    /// Matched to a detection in the most recent frame
    OnScreen,
    /// Not matched in the most recent frame, not yet pruned
    OffScreen,
}
