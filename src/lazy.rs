//! Thread-safe lazy accumulation of per-frame scores.
//!
//! Frame-by-frame pipelines rarely hold a whole time-lapse in memory. The
//! [`LazyAccumulator`] folds one frame pair at a time into running totals
//! and can report the score over everything seen so far at any point.

use std::sync::Mutex;

use ndarray::{ArrayViewD, Axis};

use crate::labels::{check_same_shape, is_time_lapse, Label, Labeling, TIME_AXIS};
use crate::{det, seg, Result};

/// Reduction strategy folded by a [`LazyAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scorer {
    /// Mean IoU over matched ground-truth labels.
    Seg,
    /// Detection accuracy with the given penalty weights.
    Det(det::Weights),
}

/// Running totals shared by both reducers.
///
/// The numerator/denominator pair is only read or written together under
/// the accumulator lock, so no torn pair is observable.
#[derive(Debug, Clone, Copy)]
struct RunningTotals {
    /// Sum of matched IoUs (SEG) or accumulated AOGM penalty (DET).
    numerator: f64,
    /// Ground-truth labels over all frames.
    n_gt: usize,
    /// Largest split multiplicity seen in any frame.
    max_ns: usize,
    /// Frames folded in so far.
    frames: u64,
}

impl Default for RunningTotals {
    fn default() -> Self {
        Self { numerator: 0.0, n_gt: 0, max_ns: 1, frames: 0 }
    }
}

/// Incremental, thread-safe scoring over frames fed one at a time.
///
/// The expensive per-frame work (confusion matrix, cost matrix, reduction)
/// runs without any lock; only the fold of the per-frame summary into the
/// totals and the score snapshot take the internal mutex. Accumulation is
/// commutative, so any interleaving of the same frames yields the same
/// score, and reads never finalise: frames can keep arriving after a score
/// has been read.
///
/// # Example
///
/// ```rust,ignore
/// let metrics = LazyAccumulator::seg();
/// for (gt, pred) in frames {
///     metrics.add_time_point(gt.view(), pred.view())?;
/// }
/// let score = metrics.compute_score();
/// ```
#[derive(Debug)]
pub struct LazyAccumulator {
    scorer: Scorer,
    totals: Mutex<RunningTotals>,
}

impl LazyAccumulator {
    /// Create an accumulator for the given reduction strategy.
    pub fn new(scorer: Scorer) -> Self {
        Self {
            scorer,
            totals: Mutex::new(RunningTotals::default()),
        }
    }

    /// Shorthand for a SEG accumulator.
    pub fn seg() -> Self {
        Self::new(Scorer::Seg)
    }

    /// Shorthand for a DET accumulator with the given weights.
    pub fn det(weights: det::Weights) -> Self {
        Self::new(Scorer::Det(weights))
    }

    /// The reduction strategy this accumulator folds.
    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    /// Add one time point to the running totals.
    ///
    /// Callable concurrently from multiple threads sharing the accumulator.
    /// A 4D input with more than one time index is hypersliced along the
    /// time axis and folded frame by frame, so objects never match across
    /// time.
    ///
    /// # Arguments
    /// * `ground_truth` - Ground-truth label frame
    /// * `prediction` - Prediction label frame of the same shape
    pub fn add_time_point<T: Label, U: Label>(
        &self,
        ground_truth: ArrayViewD<'_, T>,
        prediction: ArrayViewD<'_, U>,
    ) -> Result<()> {
        check_same_shape(ground_truth.shape(), prediction.shape())?;

        if !is_time_lapse(ground_truth.shape()) {
            let delta = self.reduce(ground_truth, prediction)?;
            self.fold(delta);
            return Ok(());
        }

        for t in 0..ground_truth.shape()[TIME_AXIS] {
            let delta = self.reduce(
                ground_truth.index_axis(Axis(TIME_AXIS), t),
                prediction.index_axis(Axis(TIME_AXIS), t),
            )?;
            self.fold(delta);
        }
        Ok(())
    }

    /// Add one multi-label time point.
    ///
    /// Fails with `Error::IntersectingLabels` when either labeling assigns
    /// more than one label to a pixel; nothing is folded in that case.
    pub fn add_labeling<T: Label, U: Label, L, M>(
        &self,
        ground_truth: &Labeling<'_, T, L>,
        prediction: &Labeling<'_, U, M>,
    ) -> Result<()> {
        self.add_time_point(
            ground_truth.require_disjoint()?,
            prediction.require_disjoint()?,
        )
    }

    /// Current score over everything folded so far.
    ///
    /// Non-finalising: NaN before any frame has been added, and later adds
    /// keep contributing. The totals are snapshotted under the lock, so a
    /// concurrent add never produces a torn numerator/denominator read.
    pub fn compute_score(&self) -> f64 {
        let totals = *self.totals.lock().unwrap();

        match self.scorer {
            Scorer::Seg => seg::FrameResult {
                sum_iou: totals.numerator,
                n_gt: totals.n_gt,
            }
            .score(),
            Scorer::Det(ref weights) => det::FrameResult {
                aogm: totals.numerator,
                n_gt: totals.n_gt,
                max_ns: totals.max_ns,
            }
            .score(weights),
        }
    }

    /// Number of frames folded so far.
    pub fn frames_added(&self) -> u64 {
        self.totals.lock().unwrap().frames
    }

    /// Reduce one frame pair to a single-frame delta, outside any lock.
    fn reduce<T: Label, U: Label>(
        &self,
        ground_truth: ArrayViewD<'_, T>,
        prediction: ArrayViewD<'_, U>,
    ) -> Result<RunningTotals> {
        let delta = match self.scorer {
            Scorer::Seg => {
                let frame = seg::reduce_frame(ground_truth, prediction)?;
                RunningTotals {
                    numerator: frame.sum_iou,
                    n_gt: frame.n_gt,
                    max_ns: 1,
                    frames: 1,
                }
            }
            Scorer::Det(ref weights) => {
                let frame = det::reduce_frame(ground_truth, prediction, weights)?;
                RunningTotals {
                    numerator: frame.aogm,
                    n_gt: frame.n_gt,
                    max_ns: frame.max_ns,
                    frames: 1,
                }
            }
        };
        Ok(delta)
    }

    /// Fold a delta into the totals under the lock.
    fn fold(&self, delta: RunningTotals) {
        let mut totals = self.totals.lock().unwrap();
        totals.numerator += delta.numerator;
        totals.n_gt += delta.n_gt;
        totals.max_ns = totals.max_ns.max(delta.max_ns);
        totals.frames += delta.frames;
    }
}
