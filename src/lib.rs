//! # Segmetrics - Segmentation Scoring Library
//!
//! Scoring engine for cell segmentation and tracking benchmarks.
//!
//! Compares an integer-labelled ground-truth volume against a prediction
//! volume (2D, 3D or 4D time-lapse, pixel value 0 = background) and computes
//! the SEG score (mean IoU over matched ground-truth objects) and the DET
//! score (detection accuracy derived from the AOGM penalty).
//!
//! ## Features
//!
//! - Single-pass confusion matrix over sparse integer labels
//! - IoU cost matrices with the fixed 0.5 matching threshold
//! - SEG and DET reducers sharing the same per-frame machinery
//! - Time-lapse (4D) scoring, frames scored independently and in parallel
//! - Thread-safe lazy accumulation for frame-by-frame pipelines
//!
//! ## Example
//!
//! ```rust,ignore
//! use ndarray::ArrayD;
//! use segmetrics::{seg, LazyAccumulator};
//!
//! // Score a whole volume at once
//! let score = seg::score(groundtruth.view(), prediction.view()).unwrap();
//!
//! // Or feed frames as they come, from any number of threads
//! let metrics = LazyAccumulator::seg();
//! metrics.add_time_point(gt_frame.view(), pred_frame.view()).unwrap();
//! let running = metrics.compute_score();
//! ```

// Public modules
pub mod confusion;
pub mod det;
pub mod labels;
pub mod lazy;
pub mod overlap;
pub mod seg;
pub mod utils;

// Re-exports for convenience
pub use confusion::ConfusionMatrix;
pub use det::{check_minimality_condition, Weights};
pub use labels::{Label, Labeling};
pub use lazy::{LazyAccumulator, Scorer};
pub use overlap::{cost_matrix, MATCHING_THRESHOLD};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the segmetrics library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Dimension mismatch: ground truth {expected:?}, prediction {found:?}")]
        ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },

        #[error("Intersecting labels are not supported: a pixel carries more than one label")]
        IntersectingLabels,
    }

    /// Result type for segmetrics operations
    pub type Result<T> = std::result::Result<T, Error>;
}
