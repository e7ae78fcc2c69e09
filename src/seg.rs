//! SEG score: mean IoU over matched ground-truth labels.
//!
//! Each ground-truth object contributes the IoU of its matched prediction
//! (or 0 when unmatched); the score is the mean contribution, the
//! Jaccard-based segmentation accuracy of cell-tracking benchmarks.

use nalgebra::DMatrix;
use ndarray::{ArrayViewD, Axis};
use rayon::prelude::*;

use crate::confusion::ConfusionMatrix;
use crate::labels::{check_same_shape, is_time_lapse, Label, Labeling, TIME_AXIS};
use crate::overlap;
use crate::Result;

/// Per-frame SEG summary: matched IoU sum and ground-truth label count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameResult {
    /// Sum of the matched IoU of every ground-truth label.
    pub sum_iou: f64,
    /// Number of ground-truth labels.
    pub n_gt: usize,
}

impl FrameResult {
    /// Fold another frame into this one.
    pub fn merge(&mut self, other: &FrameResult) {
        self.sum_iou += other.sum_iou;
        self.n_gt += other.n_gt;
    }

    /// SEG score of the merged frames: `sum_iou / n_gt`, or NaN when no
    /// ground-truth label was seen.
    pub fn score(&self) -> f64 {
        if self.n_gt == 0 {
            return f64::NAN;
        }
        self.sum_iou / self.n_gt as f64
    }
}

/// Reduce one cost matrix to its SEG summary.
///
/// Every ground-truth row contributes its matched IoU; unmatched rows
/// contribute 0. Disjoint labels leave at most one nonzero entry per row.
pub fn frame_result(costs: &DMatrix<f64>) -> FrameResult {
    FrameResult {
        sum_iou: costs.iter().sum(),
        n_gt: costs.nrows(),
    }
}

/// Compute the SEG score between two label volumes.
///
/// 2D and 3D volumes are scored as a single frame. A 4D volume is a
/// time-lapse: every time index is scored independently (in parallel) and
/// the per-frame results are merged before the final division, so objects
/// never match across frames.
///
/// # Arguments
/// * `ground_truth` - Ground-truth label volume
/// * `prediction` - Prediction label volume of the same shape
///
/// # Returns
/// The SEG score in [0, 1], or NaN when the ground truth has no labels.
pub fn score<T: Label, U: Label>(
    ground_truth: ArrayViewD<'_, T>,
    prediction: ArrayViewD<'_, U>,
) -> Result<f64> {
    Ok(reduce_volume(ground_truth, prediction)?.score())
}

/// Compute the SEG score between two multi-label volumes.
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

/// Reduce a volume pair to its merged SEG summary.
fn reduce_volume<T: Label, U: Label>(
    ground_truth: ArrayViewD<'_, T>,
    prediction: ArrayViewD<'_, U>,
) -> Result<FrameResult> {
    check_same_shape(ground_truth.shape(), prediction.shape())?;

    if !is_time_lapse(ground_truth.shape()) {
        return reduce_frame(ground_truth, prediction);
    }

    let frames = ground_truth.shape()[TIME_AXIS];
    let results: Result<Vec<FrameResult>> = (0..frames)
        .into_par_iter()
        .map(|t| {
            reduce_frame(
                ground_truth.index_axis(Axis(TIME_AXIS), t),
                prediction.index_axis(Axis(TIME_AXIS), t),
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
) -> Result<FrameResult> {
    let confusion = ConfusionMatrix::new(ground_truth, prediction)?;
    Ok(frame_result(&overlap::cost_matrix(&confusion)))
}
