//! Confusion matrix between the labels of a ground-truth and a prediction
//! volume.

use std::collections::HashMap;

use nalgebra::DMatrix;
use ndarray::{ArrayViewD, Zip};

use crate::labels::{check_same_shape, Label};
use crate::Result;

/// Pairwise pixel overlaps between ground-truth and prediction labels.
///
/// Sparse label values are renumbered densely in first-encounter order:
/// ground-truth labels to rows `0..nGT`, prediction labels to columns
/// `0..nPred`. Background (raw value 0) gets no row or column. The matrix
/// is built in a single pass over the pixel pairs and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    /// Overlap pixel counts, one row per ground-truth label.
    overlap: DMatrix<u64>,
    /// Pixel count of each ground-truth label.
    gt_sizes: Vec<u64>,
    /// Pixel count of each prediction label.
    pred_sizes: Vec<u64>,
}

impl ConfusionMatrix {
    /// Build the confusion matrix for one frame pair.
    ///
    /// # Arguments
    /// * `ground_truth` - Ground-truth label volume
    /// * `prediction` - Prediction label volume of the same shape
    ///
    /// # Returns
    /// The confusion matrix, or `Error::ShapeMismatch` when the volume
    /// shapes differ.
    pub fn new<T: Label, U: Label>(
        ground_truth: ArrayViewD<'_, T>,
        prediction: ArrayViewD<'_, U>,
    ) -> Result<Self> {
        check_same_shape(ground_truth.shape(), prediction.shape())?;

        let mut gt_indices: HashMap<u64, usize> = HashMap::new();
        let mut pred_indices: HashMap<u64, usize> = HashMap::new();
        let mut gt_sizes: Vec<u64> = Vec::new();
        let mut pred_sizes: Vec<u64> = Vec::new();
        let mut overlaps: HashMap<(usize, usize), u64> = HashMap::new();

        Zip::from(&ground_truth)
            .and(&prediction)
            .for_each(|&gt, &pred| {
                let gt_idx = count_label(gt.raw(), &mut gt_indices, &mut gt_sizes);
                let pred_idx = count_label(pred.raw(), &mut pred_indices, &mut pred_sizes);

                if let (Some(i), Some(j)) = (gt_idx, pred_idx) {
                    *overlaps.entry((i, j)).or_insert(0) += 1;
                }
            });

        let mut overlap = DMatrix::zeros(gt_sizes.len(), pred_sizes.len());
        for ((i, j), count) in overlaps {
            overlap[(i, j)] = count;
        }

        Ok(Self { overlap, gt_sizes, pred_sizes })
    }

    /// Number of distinct ground-truth labels (rows).
    pub fn num_ground_truth_labels(&self) -> usize {
        self.gt_sizes.len()
    }

    /// Number of distinct prediction labels (columns).
    pub fn num_prediction_labels(&self) -> usize {
        self.pred_sizes.len()
    }

    /// Overlap pixel count between ground-truth label `i` and prediction
    /// label `j` (dense indices).
    pub fn overlap(&self, i: usize, j: usize) -> u64 {
        self.overlap[(i, j)]
    }

    /// Pixel count of ground-truth label `i`.
    pub fn ground_truth_size(&self, i: usize) -> u64 {
        self.gt_sizes[i]
    }

    /// Pixel count of prediction label `j`.
    pub fn prediction_size(&self, j: usize) -> u64 {
        self.pred_sizes[j]
    }
}

/// Bump the pixel count of `raw`, assigning the next dense index on first
/// encounter. Background is skipped.
fn count_label(
    raw: u64,
    indices: &mut HashMap<u64, usize>,
    sizes: &mut Vec<u64>,
) -> Option<usize> {
    if raw == 0 {
        return None;
    }
    let idx = *indices.entry(raw).or_insert_with(|| {
        sizes.push(0);
        sizes.len() - 1
    });
    sizes[idx] += 1;
    Some(idx)
}
