//! DET score: detection accuracy derived from the AOGM penalty.
//!
//! The AOGM penalty counts the weighted node edits needed to turn the
//! predicted detections into the ground truth: missed objects (false
//! negatives), spurious predictions (false positives) and predictions
//! covering several objects (splits). The score normalises the penalty
//! against the cost of the empty prediction and clamps at 0.

use nalgebra::DMatrix;
use ndarray::{ArrayViewD, Axis};
use rayon::prelude::*;

use crate::confusion::ConfusionMatrix;
use crate::labels::{check_same_shape, is_time_lapse, Label, Labeling, TIME_AXIS};
use crate::overlap;
use crate::utils::warn_once;
use crate::Result;

/// Penalty weights of the AOGM sum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weights {
    /// Cost of a missed ground-truth object (wFN).
    pub false_negative: f64,
    /// Cost of a spurious prediction (wFP).
    pub false_positive: f64,
    /// Cost per extra assignment when one prediction covers several
    /// ground-truth objects (wNS).
    pub split: f64,
}

impl Weights {
    /// Create a set of penalty weights.
    pub fn new(false_negative: f64, false_positive: f64, split: f64) -> Self {
        Self { false_negative, false_positive, split }
    }
}

impl Default for Weights {
    /// Benchmark reference weights: wFN = 10, wFP = 1, wNS = 5.
    fn default() -> Self {
        Self {
            false_negative: 10.0,
            false_positive: 1.0,
            split: 5.0,
        }
    }
}

/// Check that the penalty weights make the counted edit path minimal.
///
/// Pairing a prediction with each of its `max_ns` ground-truth objects must
/// not cost more than deleting the prediction and re-adding the objects:
/// `(max_ns - 1) * split <= false_positive + max_ns * false_negative`.
/// The score stays well defined when this fails; the counted path is then
/// merely not the cheapest one.
pub fn check_minimality_condition(weights: &Weights, max_ns: usize) -> bool {
    (max_ns as f64 - 1.0) * weights.split
        <= weights.false_positive + max_ns as f64 * weights.false_negative
}

/// Per-frame DET summary: accumulated penalty, ground-truth label count and
/// largest split multiplicity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameResult {
    /// Accumulated AOGM penalty.
    pub aogm: f64,
    /// Number of ground-truth labels.
    pub n_gt: usize,
    /// Largest number of ground-truth objects assigned to one prediction.
    pub max_ns: usize,
}

impl Default for FrameResult {
    fn default() -> Self {
        Self { aogm: 0.0, n_gt: 0, max_ns: 1 }
    }
}

impl FrameResult {
    /// Fold another frame into this one.
    pub fn merge(&mut self, other: &FrameResult) {
        self.aogm += other.aogm;
        self.n_gt += other.n_gt;
        self.max_ns = self.max_ns.max(other.max_ns);
    }

    /// DET score of the merged frames.
    ///
    /// `aogm0 = false_negative * n_gt` is the penalty of the empty
    /// prediction; the score is `1 - min(aogm, aogm0) / aogm0`, or NaN when
    /// `aogm0` is not positive. Warns once when the weights violate the
    /// minimality condition for the observed `max_ns`.
    pub fn score(&self, weights: &Weights) -> f64 {
        if !check_minimality_condition(weights, self.max_ns) {
            warn_once(
                "DET weights violate the minimality condition: deleting a split \
                 prediction and re-adding its objects would cost less than the \
                 counted penalty",
            );
        }

        let aogm0 = weights.false_negative * self.n_gt as f64;
        if aogm0 > 0.0 {
            1.0 - self.aogm.min(aogm0) / aogm0
        } else {
            f64::NAN
        }
    }
}

/// Reduce one cost matrix to its DET summary.
///
/// Ground-truth rows with no match add `false_negative`, prediction columns
/// with no match add `false_positive`, and a column matched by n > 1 rows
/// adds `(n - 1) * split`. With no prediction columns every row is a false
/// negative; with no ground-truth rows every column is a false positive.
pub fn frame_result(costs: &DMatrix<f64>, weights: &Weights) -> FrameResult {
    let mut result = FrameResult {
        n_gt: costs.nrows(),
        ..FrameResult::default()
    };

    for i in 0..costs.nrows() {
        if costs.row(i).iter().all(|&c| c <= 0.0) {
            result.aogm += weights.false_negative;
        }
    }

    for j in 0..costs.ncols() {
        let matches = costs.column(j).iter().filter(|&&c| c > 0.0).count();
        if matches == 0 {
            result.aogm += weights.false_positive;
        } else if matches > 1 {
            result.aogm += (matches - 1) as f64 * weights.split;
            result.max_ns = result.max_ns.max(matches);
        }
    }

    result
}

/// Compute the DET score between two label volumes with the reference
/// weights.
///
/// 2D and 3D volumes are scored as a single frame. A 4D volume is a
/// time-lapse: every time index is scored independently (in parallel) and
/// the per-frame results are merged before the final normalisation, so
/// objects never match across frames.
///
/// # Arguments
/// * `ground_truth` - Ground-truth label volume
/// * `prediction` - Prediction label volume of the same shape
///
/// # Returns
/// The DET score in [0, 1], or NaN when the ground truth has no labels.
pub fn score<T: Label, U: Label>(
    ground_truth: ArrayViewD<'_, T>,
    prediction: ArrayViewD<'_, U>,
) -> Result<f64> {
    score_with_weights(ground_truth, prediction, &Weights::default())
}

/// Compute the DET score between two label volumes with custom weights.
pub fn score_with_weights<T: Label, U: Label>(
    ground_truth: ArrayViewD<'_, T>,
    prediction: ArrayViewD<'_, U>,
    weights: &Weights,
) -> Result<f64> {
    Ok(reduce_volume(ground_truth, prediction, weights)?.score(weights))
}

/// Compute the DET score between two multi-label volumes with the reference
/// weights.
///
/// Fails with `Error::IntersectingLabels` when either labeling assigns more
/// than one label to a pixel; otherwise scores the index images.
pub fn score_labeling<T: Label, U: Label, L, M>(
    ground_truth: &Labeling<'_, T, L>,
    prediction: &Labeling<'_, U, M>,
) -> Result<f64> {
    score(
        ground_truth.require_disjoint()?,
        prediction.require_disjoint()?,
    )
}

/// Reduce a volume pair to its merged DET summary.
fn reduce_volume<T: Label, U: Label>(
    ground_truth: ArrayViewD<'_, T>,
    prediction: ArrayViewD<'_, U>,
    weights: &Weights,
) -> Result<FrameResult> {
    check_same_shape(ground_truth.shape(), prediction.shape())?;

    if !is_time_lapse(ground_truth.shape()) {
        return reduce_frame(ground_truth, prediction, weights);
    }

    let frames = ground_truth.shape()[TIME_AXIS];
    let results: Result<Vec<FrameResult>> = (0..frames)
        .into_par_iter()
        .map(|t| {
            reduce_frame(
                ground_truth.index_axis(Axis(TIME_AXIS), t),
                prediction.index_axis(Axis(TIME_AXIS), t),
                weights,
            )
        })
        .collect();

    let mut total = FrameResult::default();
    for result in results? {
        total.merge(&result);
    }
    Ok(total)
}

/// Reduce a single frame pair (no time axis handling).
pub(crate) fn reduce_frame<T: Label, U: Label>(
    ground_truth: ArrayViewD<'_, T>,
    prediction: ArrayViewD<'_, U>,
    weights: &Weights,
) -> Result<FrameResult> {
    let confusion = ConfusionMatrix::new(ground_truth, prediction)?;
    Ok(frame_result(&overlap::cost_matrix(&confusion), weights))
}
