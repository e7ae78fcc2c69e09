//! Shared fixtures: rectangle painting and expected scores.
//!
//! Rectangles are `[min_x, min_y, max_x, max_y]` with inclusive bounds.

#![allow(dead_code)]

use ndarray::{ArrayD, IxDyn};

/// Paint a rectangle of a 2D volume with `value`.
pub fn paint_rect(img: &mut ArrayD<u32>, rect: [usize; 4], value: u32) {
    for x in rect[0]..=rect[2] {
        for y in rect[1]..=rect[3] {
            img[IxDyn(&[x, y])] = value;
        }
    }
}

/// Paint a rectangle on one Z-slice of a 3D volume.
pub fn paint_rect_z(img: &mut ArrayD<u32>, rect: [usize; 4], z: usize, value: u32) {
    for x in rect[0]..=rect[2] {
        for y in rect[1]..=rect[3] {
            img[IxDyn(&[x, y, z])] = value;
        }
    }
}

/// Paint a rectangle on one Z-slice of one time frame of a 4D volume.
pub fn paint_rect_zt(img: &mut ArrayD<u32>, rect: [usize; 4], z: usize, t: usize, value: u32) {
    for x in rect[0]..=rect[2] {
        for y in rect[1]..=rect[3] {
            img[IxDyn(&[x, y, z, t])] = value;
        }
    }
}

/// Expected contribution of a ground-truth rectangle scored against a
/// prediction rectangle: the IoU when above 0.5, else 0.
///
/// Painting both rectangles over several Z-slices scales intersection and
/// areas alike, so the value also holds for the volume pairs built with
/// [`paint_rect_z`] and [`paint_rect_zt`].
pub fn rect_contribution(gt: [usize; 4], pred: [usize; 4]) -> f64 {
    let left = gt[0].max(pred[0]);
    let right = gt[2].min(pred[2]);
    let bottom = gt[1].max(pred[1]);
    let top = gt[3].min(pred[3]);

    if left > right || bottom > top {
        return 0.0;
    }

    let intersection = ((right - left + 1) * (top - bottom + 1)) as f64;
    let gt_area = ((gt[2] - gt[0] + 1) * (gt[3] - gt[1] + 1)) as f64;
    let pred_area = ((pred[2] - pred[0] + 1) * (pred[3] - pred[1] + 1)) as f64;
    let iou = intersection / (gt_area + pred_area - intersection);

    if iou > 0.5 {
        iou
    } else {
        0.0
    }
}

/// Mean of per-object contributions (the expected SEG score).
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
