//! Leg phantom synthesis
//!
//! The phantom is a soft tissue cylinder with a concentric bone core,
//! extruded along depth. Every depth slice is the same cross-section, so the
//! label map is computed once and repeated for each slice.

use ndarray::{Array2, Array3};

use crate::error::PhantomResult;
use crate::params::PhantomParams;
use crate::volume::{Tissue, Volume};

/// Tissue class at planar distance `distance` from the limb axis
pub fn classify(distance: f64, params: &PhantomParams) -> Tissue {
    if distance <= params.bone_radius as f64 {
        Tissue::Bone
    } else if distance <= params.leg_radius as f64 {
        Tissue::SoftTissue
    } else {
        Tissue::Background
    }
}

/// 2D label map of one depth slice, shape `(2·leg_radius, 2·leg_radius)`
pub fn cross_section(params: &PhantomParams) -> Array2<u8> {
    let width = params.width();
    let center = params.leg_radius as f64;

    Array2::from_shape_fn((width, width), |(x, y)| {
        let dx = x as f64 - center;
        let dy = y as f64 - center;
        classify((dx * dx + dy * dy).sqrt(), params).label()
    })
}

/// Build the labeled phantom volume
pub fn synthesize(params: &PhantomParams) -> PhantomResult<Volume> {
    params.validate()?;

    let section = cross_section(params);
    let data = Array3::from_shape_fn(params.shape(), |(_, x, y)| section[[x, y]]);

    log::debug!(
        "Synthesized phantom {:?} (leg {}, bone {})",
        params.shape(),
        params.leg_radius,
        params.bone_radius
    );

    Ok(Volume::from_labels_unchecked(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhantomError;
    use ndarray::Axis;

    /// Per-voxel reference with no broadcasting
    fn synthesize_naive(params: &PhantomParams) -> Array3<u8> {
        let r = params.leg_radius as f64;
        let mut data = Array3::zeros(params.shape());
        for ((_, x, y), voxel) in data.indexed_iter_mut() {
            let distance = ((x as f64 - r).powi(2) + (y as f64 - r).powi(2)).sqrt();
            *voxel = if distance <= params.bone_radius as f64 {
                2
            } else if distance <= r {
                1
            } else {
                0
            };
        }
        data
    }

    #[test]
    fn test_matches_per_voxel_definition() {
        for params in [
            PhantomParams::new(5, 2, 3),
            PhantomParams::new(12, 7, 4),
            PhantomParams::new(9, 1, 2),
        ] {
            let volume = synthesize(&params).unwrap();
            assert_eq!(volume.as_array(), &synthesize_naive(&params));
        }
    }

    #[test]
    fn test_depth_invariant() {
        let volume = synthesize(&PhantomParams::new(10, 4, 6)).unwrap();
        let first = volume.slice(0).unwrap().to_owned();
        for slice in volume.as_array().axis_iter(Axis(0)) {
            assert_eq!(slice, first);
        }
    }

    #[test]
    fn test_deterministic() {
        let params = PhantomParams::new(15, 6, 8);
        assert_eq!(synthesize(&params).unwrap(), synthesize(&params).unwrap());
    }

    #[test]
    fn test_classify_boundaries() {
        let params = PhantomParams::new(50, 20, 1);
        assert_eq!(classify(0.0, &params), Tissue::Bone);
        assert_eq!(classify(20.0, &params), Tissue::Bone);
        assert_eq!(classify(20.0001, &params), Tissue::SoftTissue);
        assert_eq!(classify(50.0, &params), Tissue::SoftTissue);
        assert_eq!(classify(50.5, &params), Tissue::Background);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let result = synthesize(&PhantomParams::new(10, 10, 5));
        assert!(matches!(result, Err(PhantomError::InvalidParameter(_))));
    }
}
