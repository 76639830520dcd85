//! Image rotation helpers
//!
//! Two rotation semantics live here: [`rot90`] permutes pixels by whole
//! quarter turns and swaps the axes, while [`rotate_image`] resamples at an
//! arbitrary angle inside the input's own frame.

use ndarray::{Array2, ArrayView2, s};
use serde::{Deserialize, Serialize};

/// Sampling kernel for continuous rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Nearest pixel
    Nearest,
    /// Bilinear blend of the four neighbours
    #[default]
    Bilinear,
}

/// Number of quarter turns for `angle_deg`, floored and wrapped to 0..4
pub fn quarter_turns(angle_deg: f64) -> usize {
    ((angle_deg / 90.0).floor() as i64).rem_euclid(4) as usize
}

/// Rotate by `k` quarter turns, same orientation as numpy's `rot90`.
///
/// For `k == 1`, `out[i, j] = image[j, cols - 1 - i]`.
pub fn rot90<A: Clone>(image: ArrayView2<'_, A>, k: usize) -> Array2<A> {
    match k % 4 {
        0 => image.to_owned(),
        1 => image.slice(s![.., ..;-1]).reversed_axes().to_owned(),
        2 => image.slice(s![..;-1, ..;-1]).to_owned(),
        _ => image.reversed_axes().slice(s![.., ..;-1]).to_owned(),
    }
}

/// Sine and cosine of an angle in degrees, exact at multiples of 90°
fn sin_cos_deg(angle_deg: f64) -> (f64, f64) {
    if angle_deg.rem_euclid(90.0) == 0.0 {
        match quarter_turns(angle_deg) {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        }
    } else {
        angle_deg.to_radians().sin_cos()
    }
}

fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Sample `image` at fractional (row, col); coordinates past the edge take
/// the nearest edge pixel.
fn sample(image: &ArrayView2<'_, f64>, row: f64, col: f64, interpolation: Interpolation) -> f64 {
    let (rows, cols) = image.dim();
    let at = |i: isize, j: isize| image[[clamp_index(i, rows), clamp_index(j, cols)]];

    match interpolation {
        Interpolation::Nearest => at(row.round() as isize, col.round() as isize),
        Interpolation::Bilinear => {
            let r0 = row.floor();
            let c0 = col.floor();
            let tr = row - r0;
            let tc = col - c0;
            let (i, j) = (r0 as isize, c0 as isize);

            let top = at(i, j) * (1.0 - tc) + at(i, j + 1) * tc;
            let bottom = at(i + 1, j) * (1.0 - tc) + at(i + 1, j + 1) * tc;
            top * (1.0 - tr) + bottom * tr
        }
    }
}

/// Rotate about the image centre, keeping the input shape.
///
/// Output pixel `o` samples the input at `R·(o − c) + c` with
/// `R = [[cos, sin], [−sin, cos]]` and `c` the centre in (row, col).
pub fn rotate_image(
    image: ArrayView2<'_, f64>,
    angle_deg: f64,
    interpolation: Interpolation,
) -> Array2<f64> {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Array2::zeros((rows, cols));
    }

    let (sin, cos) = sin_cos_deg(angle_deg);
    let ci = (rows as f64 - 1.0) / 2.0;
    let cj = (cols as f64 - 1.0) / 2.0;

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let di = i as f64 - ci;
        let dj = j as f64 - cj;
        let src_i = ci + cos * di + sin * dj;
        let src_j = cj - sin * di + cos * dj;
        sample(&image, src_i, src_j, interpolation)
    })
}

/// Padding that keeps every corner inside the frame under any rotation
pub fn rotation_padding(rows: usize, cols: usize) -> usize {
    rows.max(cols).div_ceil(2)
}

/// Zero-pad `pad_rows` above and below, `pad_cols` left and right
pub fn pad_symmetric(image: ArrayView2<'_, f64>, pad_rows: usize, pad_cols: usize) -> Array2<f64> {
    let (rows, cols) = image.dim();
    let mut padded = Array2::zeros((rows + 2 * pad_rows, cols + 2 * pad_cols));
    padded
        .slice_mut(s![pad_rows..pad_rows + rows, pad_cols..pad_cols + cols])
        .assign(&image);
    padded
}

/// Central `rows × cols` window, clamped to the image
pub fn crop_center(image: ArrayView2<'_, f64>, rows: usize, cols: usize) -> Array2<f64> {
    let (full_rows, full_cols) = image.dim();
    let rows = rows.min(full_rows);
    let cols = cols.min(full_cols);
    let r0 = (full_rows - rows) / 2;
    let c0 = (full_cols - cols) / 2;
    image.slice(s![r0..r0 + rows, c0..c0 + cols]).to_owned()
}
