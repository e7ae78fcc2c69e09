//! IoU cost matrix between ground-truth and prediction labels.

use nalgebra::DMatrix;

use crate::confusion::ConfusionMatrix;

/// Minimum Jaccard index for a ground-truth/prediction pair to count as a
/// match.
///
/// Above 0.5 a pairing is unambiguous: disjoint labels admit at most one
/// such partner per row and per column, so no bipartite optimisation is
/// needed.
pub const MATCHING_THRESHOLD: f64 = 0.5;

/// Compute the IoU cost matrix of a confusion matrix.
///
/// Entry `(i, j)` is the Jaccard index between ground-truth label `i` and
/// prediction label `j` when it exceeds [`MATCHING_THRESHOLD`], else 0.
///
/// # Arguments
/// * `confusion` - Confusion matrix of one frame pair
///
/// # Returns
/// An `nGT x nPred` matrix of thresholded IoU scores.
pub fn cost_matrix(confusion: &ConfusionMatrix) -> DMatrix<f64> {
    let rows = confusion.num_ground_truth_labels();
    let cols = confusion.num_prediction_labels();

    let mut costs = DMatrix::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            costs[(i, j)] = matched_iou(confusion, i, j);
        }
    }

    costs
}

/// IoU between one label pair, zeroed at or below the matching threshold.
fn matched_iou(confusion: &ConfusionMatrix, i: usize, j: usize) -> f64 {
    let intersection = confusion.overlap(i, j) as f64;
    if intersection == 0.0 {
        return 0.0;
    }

    let union = confusion.ground_truth_size(i) as f64
        + confusion.prediction_size(j) as f64
        - intersection;
    let iou = intersection / union;

    if iou > MATCHING_THRESHOLD {
        iou
    } else {
        0.0
    }
}
