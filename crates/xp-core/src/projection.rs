//! X-ray projections of a phantom volume
//!
//! Three projection paths, not interchangeable:
//!
//! - [`project_sum`]: quarter-turn rotation, then label sums along depth.
//! - [`project_attenuated`]: Beer–Lambert transmission with energy-dependent
//!   attenuation per tissue class.
//! - [`adjust_slice`]: single-slice preview rotated by an arbitrary angle and
//!   normalized for display.

use std::ops::Range;

use ndarray::{Array2, ArrayView2, Axis, Zip, s};

use crate::error::{PhantomError, PhantomResult};
use crate::params::BeamParams;
use crate::rotate::{
    Interpolation, crop_center, pad_symmetric, quarter_turns, rot90, rotate_image,
    rotation_padding,
};
use crate::volume::{Tissue, Volume};

/// 2D projection image indexed by (row, column)
pub type Image2D = Array2<f64>;

/// Sum labels along depth after rotating by `floor(angle / 90)` quarter turns
pub fn project_sum(volume: &Volume, angle_deg: f64) -> Image2D {
    project_sum_range(volume, angle_deg, 0..volume.depth())
}

/// Like [`project_sum`], restricted to depth indices in `z_range` (clamped)
pub fn project_sum_range(volume: &Volume, angle_deg: f64, z_range: Range<usize>) -> Image2D {
    let depth = volume.depth();
    let end = z_range.end.min(depth);
    let start = z_range.start.min(end);

    let sums = volume
        .as_array()
        .slice(s![start..end, .., ..])
        .fold_axis(Axis(0), 0.0, |acc, &label| acc + f64::from(label));

    // Lateral rotation commutes with the depth sum
    rot90(sums.view(), quarter_turns(angle_deg))
}

/// Per-column attenuation path sums `Σ μ` for the given beam
pub fn path_attenuation(volume: &Volume, beam: &BeamParams) -> PhantomResult<Image2D> {
    beam.validate()?;

    let bone = beam.bone_attenuation();
    let tissue = beam.tissue_attenuation();

    let sums = Zip::from(volume.as_array().lanes(Axis(0))).par_map_collect(|column| {
        column
            .iter()
            .fold(0.0, |acc, &label| match Tissue::from_label(label) {
                Some(Tissue::Bone) => acc + bone,
                Some(Tissue::SoftTissue) => acc + tissue,
                _ => acc,
            })
    });

    Ok(sums)
}

/// Transmitted intensity `exp(−Σμ / source_distance)` per column.
///
/// Values lie in `(0, 1]`; columns with no tissue transmit exactly `1`.
pub fn project_attenuated_with(volume: &Volume, beam: &BeamParams) -> PhantomResult<Image2D> {
    let mut image = path_attenuation(volume, beam)?;
    let distance = beam.source_distance;
    image.mapv_inplace(|sum| (-sum / distance).exp());

    log::debug!(
        "Attenuated projection {:?} at {} keV, {} cm",
        image.dim(),
        beam.beam_energy,
        beam.source_distance
    );
    Ok(image)
}

pub fn project_attenuated(
    volume: &Volume,
    beam_energy: f64,
    source_distance: f64,
) -> PhantomResult<Image2D> {
    project_attenuated_with(volume, &BeamParams::new(beam_energy, source_distance))
}

/// Rotated, beam-scaled and normalized preview of a single slice.
///
/// The slice is zero padded so no content leaves the frame while rotating,
/// rotated bilinearly by `angle_deg`, cropped back to its own shape, scaled
/// by [`BeamParams::slice_gain`] and divided by its maximum. An empty slice
/// yields all zeros.
pub fn adjust_slice<A>(
    slice: ArrayView2<'_, A>,
    angle_deg: f64,
    beam_energy: f64,
    source_distance: f64,
) -> PhantomResult<Image2D>
where
    A: Copy + Into<f64>,
{
    let beam = BeamParams::new(beam_energy, source_distance);
    beam.validate()?;
    if !angle_deg.is_finite() {
        return Err(PhantomError::invalid(format!(
            "angle must be finite, got {}",
            angle_deg
        )));
    }

    let (rows, cols) = slice.dim();
    let values: Array2<f64> = slice.mapv(|v| v.into());

    let pad = rotation_padding(rows, cols);
    let padded = pad_symmetric(values.view(), pad, pad);
    let rotated = rotate_image(padded.view(), angle_deg, Interpolation::Bilinear);

    let mut adjusted = crop_center(rotated.view(), rows, cols);
    let gain = beam.slice_gain();
    adjusted.mapv_inplace(|v| v * gain);
    normalize_unit(&mut adjusted);

    Ok(adjusted)
}

/// Divide by the maximum and clip to `[0, 1]`; all zeros if the maximum is not positive
pub fn normalize_unit(image: &mut Image2D) {
    let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 {
        image.mapv_inplace(|v| (v / max).clamp(0.0, 1.0));
    } else {
        image.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::cut_orthogonal;
    use crate::params::PhantomParams;
    use crate::synth::synthesize;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn phantom() -> Volume {
        synthesize(&PhantomParams::new(10, 4, 12)).unwrap()
    }

    #[test]
    fn test_sum_projection_counts_labels() {
        let volume = phantom();
        let projection = project_sum(&volume, 0.0);
        assert_eq!(projection.dim(), (20, 20));
        // Bone column: 12 slices × label 2
        assert_eq!(projection[[10, 10]], 24.0);
        // Tissue column
        assert_eq!(projection[[10, 16]], 12.0);
        // Corner is background
        assert_eq!(projection[[0, 0]], 0.0);
    }

    #[test]
    fn test_sum_projection_quarter_turn() {
        // Asymmetric volume so the rotation is observable
        let mut data = Array3::zeros((3, 4, 4));
        data[[0, 0, 3]] = 2;
        data[[1, 0, 3]] = 1;
        let volume = Volume::from_labels(data).unwrap();

        let straight = project_sum(&volume, 0.0);
        let turned = project_sum(&volume, 90.0);
        assert_eq!(straight[[0, 3]], 3.0);
        assert_eq!(turned, rot90(straight.view(), 1));
        assert_eq!(turned[[0, 0]], 3.0);

        // 45° aliases to 0°, 135° to 90°
        assert_eq!(project_sum(&volume, 45.0), straight);
        assert_eq!(project_sum(&volume, 135.0), turned);
    }

    #[test]
    fn test_sum_range_clamps() {
        let volume = phantom();
        let full = project_sum(&volume, 0.0);
        assert_eq!(project_sum_range(&volume, 0.0, 0..1000), full);
        assert!(project_sum_range(&volume, 0.0, 50..60).iter().all(|&v| v == 0.0));
        assert!(project_sum_range(&volume, 0.0, 8..3).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sum_outside_cut_matches_uncut() {
        let volume = phantom();
        let cut = cut_orthogonal(&volume, 5, 8);
        assert_eq!(
            project_sum_range(&cut, 0.0, 0..5),
            project_sum_range(&volume, 0.0, 0..5)
        );
        assert_eq!(
            project_sum_range(&cut, 0.0, 8..12),
            project_sum_range(&volume, 0.0, 8..12)
        );
        assert_ne!(project_sum(&cut, 0.0), project_sum(&volume, 0.0));
    }

    #[test]
    fn test_attenuated_range_and_background() {
        let volume = phantom();
        let image = project_attenuated(&volume, 70.0, 60.0).unwrap();
        assert!(image.iter().all(|&v| v > 0.0 && v <= 1.0));
        assert_eq!(image[[0, 0]], 1.0);
        assert!(image[[10, 10]] < image[[10, 16]]);
    }

    #[test]
    fn test_attenuated_all_bone_column() {
        let data = Array3::from_elem((100, 1, 1), Tissue::Bone.label());
        let volume = Volume::from_labels(data).unwrap();
        let image = project_attenuated(&volume, 50.0, 100.0).unwrap();
        assert_relative_eq!(image[[0, 0]], (-0.75f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(image[[0, 0]], 0.4724, epsilon = 1e-4);
    }

    #[test]
    fn test_attenuated_rejects_bad_beam() {
        let volume = phantom();
        assert!(project_attenuated(&volume, 0.0, 100.0).is_err());
        assert!(project_attenuated(&volume, 50.0, 0.0).is_err());
        assert!(project_attenuated(&volume, f64::NAN, 100.0).is_err());
        assert!(project_attenuated(&volume, 50.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_path_attenuation_sums() {
        let volume = phantom();
        let beam = BeamParams::new(100.0, 100.0);
        let sums = path_attenuation(&volume, &beam).unwrap();
        assert_relative_eq!(sums[[10, 10]], 12.0 * 1.0, epsilon = 1e-12);
        assert_relative_eq!(sums[[10, 16]], 12.0 * 0.5, epsilon = 1e-12);
        assert_eq!(sums[[0, 0]], 0.0);
    }

    #[test]
    fn test_adjust_slice_identity_at_zero_angle() {
        let volume = phantom();
        let slice = volume.slice(6).unwrap();
        let adjusted = adjust_slice(slice, 0.0, 50.0, 100.0).unwrap();

        assert_eq!(adjusted.dim(), slice.dim());
        for ((x, y), &v) in adjusted.indexed_iter() {
            assert_relative_eq!(v, f64::from(slice[[x, y]]) / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_adjust_slice_range_under_rotation() {
        let volume = phantom();
        let slice = volume.slice(0).unwrap();
        for angle in [15.0, 45.0, 90.0, 137.5, 180.0] {
            let adjusted = adjust_slice(slice, angle, 120.0, 75.0).unwrap();
            assert!(adjusted.iter().all(|&v| (0.0..=1.0).contains(&v)));
            assert_relative_eq!(adjusted.iter().copied().fold(0.0, f64::max), 1.0);
        }
    }

    #[test]
    fn test_adjust_slice_corners_rotate_in_zeros() {
        // Padded rotation brings empty space into the corners instead of
        // repeating the slice edge
        let slice = Array2::<f64>::ones((8, 8));
        let rotated = adjust_slice(slice.view(), 45.0, 50.0, 100.0).unwrap();
        assert_eq!(rotated[[0, 0]], 0.0);
        assert_eq!(rotated[[7, 7]], 0.0);
        assert_relative_eq!(rotated[[3, 3]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_adjust_slice_empty_is_zero() {
        let slice = Array2::<u8>::zeros((6, 6));
        let adjusted = adjust_slice(slice.view(), 30.0, 50.0, 100.0).unwrap();
        assert!(adjusted.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_adjust_slice_validation() {
        let slice = Array2::<u8>::ones((4, 4));
        assert!(adjust_slice(slice.view(), 0.0, -5.0, 100.0).is_err());
        assert!(adjust_slice(slice.view(), 0.0, 50.0, 0.0).is_err());
        assert!(adjust_slice(slice.view(), f64::NAN, 50.0, 100.0).is_err());
    }
}
