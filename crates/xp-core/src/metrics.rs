//! Bone / soft tissue contrast metrics

use ndarray::{Array1, ArrayView2, s};
use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, PhantomResult};
use crate::volume::{Tissue, Volume};

/// Per-class statistics of one slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceStats {
    /// Pixels with the bone value
    pub bone_pixels: usize,
    /// Pixels with the soft tissue value
    pub tissue_pixels: usize,
    /// Mean bone value (0 when there is no bone)
    pub bone_mean: f64,
    /// Mean soft tissue value (0 when there is no soft tissue)
    pub tissue_mean: f64,
    /// `|bone_mean − tissue_mean|`, or 0 if either class is missing
    pub contrast: f64,
}

/// Classify pixels by value (2 = bone, 1 = soft tissue) and summarise them
pub fn slice_stats<A>(slice: ArrayView2<'_, A>) -> SliceStats
where
    A: Copy + Into<f64>,
{
    let bone_value = f64::from(Tissue::Bone.label());
    let tissue_value = f64::from(Tissue::SoftTissue.label());

    let (mut bone_sum, mut bone_pixels) = (0.0, 0usize);
    let (mut tissue_sum, mut tissue_pixels) = (0.0, 0usize);

    for &v in slice.iter() {
        let v: f64 = v.into();
        if v == bone_value {
            bone_sum += v;
            bone_pixels += 1;
        } else if v == tissue_value {
            tissue_sum += v;
            tissue_pixels += 1;
        }
    }

    let mean = |sum: f64, n: usize| if n > 0 { sum / n as f64 } else { 0.0 };
    let bone_mean = mean(bone_sum, bone_pixels);
    let tissue_mean = mean(tissue_sum, tissue_pixels);

    let contrast = if bone_pixels > 0 && tissue_pixels > 0 {
        (bone_mean - tissue_mean).abs()
    } else {
        0.0
    };

    SliceStats {
        bone_pixels,
        tissue_pixels,
        bone_mean,
        tissue_mean,
        contrast,
    }
}

/// Absolute difference of bone and soft tissue means; 0 if either is absent
pub fn contrast<A>(slice: ArrayView2<'_, A>) -> f64
where
    A: Copy + Into<f64>,
{
    slice_stats(slice).contrast
}

/// Contrast of depth slice `z`
pub fn contrast_at(volume: &Volume, z: usize) -> PhantomResult<f64> {
    Ok(contrast(volume.slice(z)?))
}

/// Label profile along rows at fixed depth `z` and column `y`
pub fn attenuation_profile(volume: &Volume, z: usize, y: usize) -> PhantomResult<Array1<f64>> {
    let (depth, _, cols) = volume.shape();
    if z >= depth {
        return Err(PhantomError::IndexOutOfBounds {
            axis: "depth",
            index: z,
            len: depth,
        });
    }
    if y >= cols {
        return Err(PhantomError::IndexOutOfBounds {
            axis: "column",
            index: y,
            len: cols,
        });
    }

    Ok(volume.as_array().slice(s![z, .., y]).mapv(f64::from))
}
