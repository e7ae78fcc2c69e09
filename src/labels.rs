//! Label volumes: pixel label types, multi-label inputs and axis conventions.
//!
//! Volumes are borrowed [`ndarray::ArrayViewD`] views of integer pixels.
//! Pixel value 0 is background; every other value names one object. A label
//! may cover several disconnected regions within a frame and still names a
//! single object.

use ndarray::ArrayViewD;

use crate::{Error, Result};

/// Axis along which time frames are stacked in a 4D volume.
///
/// A volume with more than 3 axes and extent > 1 along this axis is a
/// time-lapse whose frames are scored independently.
pub const TIME_AXIS: usize = 3;

/// Integer pixel types usable as object labels.
///
/// The raw value identifies the object and 0 is background. The conversion
/// keeps distinct pixel values distinct for every implementing type, so
/// signed volumes work unchanged (negative values are ordinary labels).
pub trait Label: Copy + Send + Sync + 'static {
    /// Raw label value of this pixel.
    fn raw(self) -> u64;
}

macro_rules! impl_label {
    ($($t:ty),* $(,)?) => {
        $(impl Label for $t {
            #[inline]
            fn raw(self) -> u64 {
                self as u64
            }
        })*
    };
}

impl_label!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// A multi-label volume: an index image plus, per index value, the set of
/// object labels present at pixels holding that index.
///
/// Plain integer volumes cannot assign two labels to the same pixel; this
/// type covers representations that can. Scoring only accepts labelings
/// whose label sets are disjoint, in which case the index image is scored
/// directly (index values then stand in bijectively for labels).
#[derive(Debug, Clone)]
pub struct Labeling<'a, T: Label, L> {
    index_img: ArrayViewD<'a, T>,
    label_sets: Vec<Vec<L>>,
}

impl<'a, T: Label, L> Labeling<'a, T, L> {
    /// Create a labeling from an index image and its label sets.
    ///
    /// `label_sets[i]` lists the object labels encoded by index value `i`;
    /// index 0 conventionally maps to the empty set (background).
    pub fn new(index_img: ArrayViewD<'a, T>, label_sets: Vec<Vec<L>>) -> Self {
        Self { index_img, label_sets }
    }

    /// True when any index value carries more than one label.
    pub fn has_intersecting_labels(&self) -> bool {
        self.label_sets.iter().any(|set| set.len() > 1)
    }

    /// View of the index image, rejecting intersecting labels.
    ///
    /// The returned view borrows the image for `'a`, not the labeling.
    pub fn require_disjoint(&self) -> Result<ArrayViewD<'a, T>> {
        if self.has_intersecting_labels() {
            return Err(Error::IntersectingLabels);
        }
        Ok(self.index_img.clone())
    }
}

/// Check that a volume pair shares one shape, axis by axis.
pub(crate) fn check_same_shape(expected: &[usize], found: &[usize]) -> Result<()> {
    if expected != found {
        return Err(Error::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        });
    }
    Ok(())
}

/// True when the shape has a time axis with more than one frame.
pub(crate) fn is_time_lapse(shape: &[usize]) -> bool {
    shape.len() > TIME_AXIS && shape[TIME_AXIS] > 1
}
