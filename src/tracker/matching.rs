//! Matching utilities for centroid tracking.

use ndarray::Array2;

use crate::tracker::rect::{Centroid, Distance};

/// A track side of the cost matrix: predicted centroid plus its class label.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub predicted: Centroid,
    pub class_label: &'a str,
}

/// Compute the distance matrix between predicted tracks and detections.
///
/// Rows follow `tracks`, columns follow `detections`. When `class_aware` is
/// set, pairs with differing class labels are `f64::INFINITY` and can never
/// be matched.
pub fn centroid_distance_matrix(
    tracks: &[Candidate<'_>],
    detections: &[Candidate<'_>],
    distance: Distance,
    class_aware: bool,
) -> Array2<f64> {
    let mut dists = Array2::from_elem((tracks.len(), detections.len()), f64::INFINITY);
    for (i, t) in tracks.iter().enumerate() {
        for (j, d) in detections.iter().enumerate() {
            if class_aware && t.class_label != d.class_label {
                continue;
            }
            dists[[i, j]] = distance.between(&t.predicted, &d.predicted);
        }
    }
    dists
}

/// Greedy nearest-pair assignment.
///
/// Repeatedly picks the globally smallest cost among rows and columns not yet
/// used and accepts it if it is strictly below `thresh`. Columns in
/// `taken` are excluded up front. Ties go to the lowest row, then the lowest
/// column. NaN costs never match.
///
/// Returns the accepted `(row, col)` pairs in the order they were chosen.
pub fn greedy_assignment(
    cost_matrix: &Array2<f64>,
    thresh: f64,
    taken: &[bool],
) -> Vec<(usize, usize)> {
    let (num_rows, num_cols) = cost_matrix.dim();
    debug_assert_eq!(taken.len(), num_cols);

    let mut row_free = vec![true; num_rows];
    let mut col_free: Vec<bool> = taken.iter().map(|&t| !t).collect();
    let mut matches = Vec::new();

    loop {
        let mut best: Option<(usize, usize)> = None;
        let mut min_dist = thresh;
        for i in (0..num_rows).filter(|&i| row_free[i]) {
            for j in (0..num_cols).filter(|&j| col_free[j]) {
                let d = cost_matrix[[i, j]];
                if d < min_dist {
                    min_dist = d;
                    best = Some((i, j));
                }
            }
        }

        let Some((i, j)) = best else { break };
        row_free[i] = false;
        col_free[j] = false;
        matches.push((i, j));
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn candidate(x: f64, y: f64, class_label: &str) -> Candidate<'_> {
        Candidate {
            predicted: Centroid::new(x, y),
            class_label,
        }
    }

    #[test]
    fn test_distance_matrix_respects_class() {
        let tracks = [candidate(0.0, 0.0, "car"), candidate(10.0, 0.0, "person")];
        let dets = [candidate(3.0, 4.0, "car"), candidate(10.0, 1.0, "person")];

        let dists = centroid_distance_matrix(&tracks, &dets, Distance::Euclidean, true);
        assert!((dists[[0, 0]] - 5.0).abs() < 1e-9);
        assert!(dists[[0, 1]].is_infinite());
        assert!(dists[[1, 0]].is_infinite());
        assert!((dists[[1, 1]] - 1.0).abs() < 1e-9);

        let dists = centroid_distance_matrix(&tracks, &dets, Distance::Euclidean, false);
        assert!(dists.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn test_greedy_picks_global_minimum_first() {
        // Optimal assignment would be (0,1),(1,0) with total 4+4; greedy takes (0,0) first.
        let cost = array![[1.0, 4.0], [4.0, 100.0]];
        assert_eq!(greedy_assignment(&cost, 50.0, &[false, false]), vec![(0, 0)]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let cost = array![[5.0]];
        assert!(greedy_assignment(&cost, 5.0, &[false]).is_empty());
        assert_eq!(greedy_assignment(&cost, 5.1, &[false]), vec![(0, 0)]);
    }

    #[test]
    fn test_ties_go_to_lowest_row_then_column() {
        let cost = array![[2.0, 2.0], [2.0, 2.0]];
        assert_eq!(greedy_assignment(&cost, 10.0, &[false, false]), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_taken_columns_are_skipped() {
        let cost = array![[1.0, 3.0]];
        assert_eq!(greedy_assignment(&cost, 10.0, &[true, false]), vec![(0, 1)]);
    }

    #[test]
    fn test_nan_and_empty() {
        let cost = array![[f64::NAN]];
        assert!(greedy_assignment(&cost, 10.0, &[false]).is_empty());

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(greedy_assignment(&empty, 10.0, &[false, false]).is_empty());
    }
}
