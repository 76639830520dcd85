//! Fracture and slice-loss cuts
//!
//! Cuts zero every voxel matching a geometric predicate. Each cut comes in an
//! in-place form (`&mut Volume`) and a copying form that leaves the input
//! untouched, so before/after states can be compared side by side.
//!
//! Cuts never fail: ranges are clamped to the volume and planes that miss
//! the volume simply remove nothing.

use ndarray::s;
use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, PhantomResult};
use crate::params::PhantomParams;
use crate::volume::Volume;

/// Tilted cutting plane `z = m·(x − x0) + n·(y − y0) + z0`.
///
/// Voxels on or above the plane are removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPlane {
    /// Slope along rows
    pub m: f64,
    /// Slope along columns
    pub n: f64,
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
}

impl CutPlane {
    pub fn new(m: f64, n: f64, x0: f64, y0: f64, z0: f64) -> Self {
        Self { m, n, x0, y0, z0 }
    }

    /// Plane through the limb axis at mid height
    pub fn through_center(params: &PhantomParams, m: f64, n: f64) -> Self {
        let r = params.leg_radius as f64;
        Self::new(m, n, r, r, (params.height / 2) as f64)
    }

    /// Depth of the plane above lateral position (x, y)
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        self.m * (x - self.x0) + self.n * (y - self.y0) + self.z0
    }

    pub fn removes(&self, z: usize, x: usize, y: usize) -> bool {
        z as f64 >= self.height_at(x as f64, y as f64)
    }

    pub fn is_finite(&self) -> bool {
        [self.m, self.n, self.x0, self.y0, self.z0]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// A single cut predicate.
///
/// `MidSplit` and `CenterPlane` are positioned relative to whatever volume
/// they are applied to, so they stay meaningful when the phantom geometry
/// changes after the cut was configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cut {
    /// Remove depth slices `z_start..z_end`
    Orthogonal { z_start: usize, z_end: usize },
    /// Remove everything on or above a tilted plane
    Angled(CutPlane),
    /// Remove slices `mid + offset_start .. mid + offset_end`, `mid = depth / 2`
    MidSplit {
        offset_start: usize,
        offset_end: usize,
    },
    /// Tilted plane through the lateral centre at mid depth
    CenterPlane { m: f64, n: f64 },
}

impl Cut {
    pub fn orthogonal(z_start: usize, z_end: usize) -> Self {
        Self::Orthogonal { z_start, z_end }
    }

    pub fn angled(plane: CutPlane) -> Self {
        Self::Angled(plane)
    }

    pub fn mid_split(offset_start: usize, offset_end: usize) -> Self {
        Self::MidSplit {
            offset_start,
            offset_end,
        }
    }

    pub fn center_plane(m: f64, n: f64) -> Self {
        Self::CenterPlane { m, n }
    }

    /// Ten-slice gap starting five slices above mid height
    pub fn default_split() -> Self {
        Self::mid_split(5, 15)
    }

    /// Oblique fracture through the limb axis, sloping down along rows
    pub fn center_fracture() -> Self {
        Self::center_plane(-0.5, 0.0)
    }

    /// Concrete cut for a volume of shape (depth, rows, columns)
    pub fn resolve(&self, shape: (usize, usize, usize)) -> Cut {
        let (depth, rows, cols) = shape;
        match *self {
            Cut::MidSplit {
                offset_start,
                offset_end,
            } => {
                let mid = depth / 2;
                Cut::orthogonal(mid + offset_start, mid + offset_end)
            }
            Cut::CenterPlane { m, n } => Cut::Angled(CutPlane::new(
                m,
                n,
                (rows / 2) as f64,
                (cols / 2) as f64,
                (depth / 2) as f64,
            )),
            concrete => concrete,
        }
    }

    /// Apply in place, returning the number of voxels removed
    pub fn apply(&self, volume: &mut Volume) -> usize {
        match self {
            Cut::Orthogonal { z_start, z_end } => {
                cut_orthogonal_in_place(volume, *z_start, *z_end)
            }
            Cut::Angled(plane) => cut_angled_in_place(volume, plane),
            Cut::MidSplit { .. } | Cut::CenterPlane { .. } => {
                self.resolve(volume.shape()).apply(volume)
            }
        }
    }

    /// Copy of `volume` with this cut applied
    pub fn applied(&self, volume: &Volume) -> Volume {
        let mut out = volume.clone();
        self.apply(&mut out);
        out
    }

    /// Only plane coefficients can be malformed
    pub fn validate(&self) -> PhantomResult<()> {
        let finite = match self {
            Cut::Angled(plane) => plane.is_finite(),
            Cut::CenterPlane { m, n } => m.is_finite() && n.is_finite(),
            _ => true,
        };
        if finite {
            Ok(())
        } else {
            Err(PhantomError::InvalidParameter(format!(
                "cut plane coefficients must be finite: {:?}",
                self
            )))
        }
    }
}

/// Zero depth slices in `[z_start, z_end)`, clamped to the volume
pub fn cut_orthogonal_in_place(volume: &mut Volume, z_start: usize, z_end: usize) -> usize {
    let depth = volume.depth();
    let start = z_start.min(depth);
    let end = z_end.min(depth);
    if start >= end {
        return 0;
    }

    let mut region = volume.as_array_mut().slice_mut(s![start..end, .., ..]);
    let removed = region.iter().filter(|&&v| v != 0).count();
    region.fill(0);

    log::debug!("Orthogonal cut {}..{} removed {} voxels", start, end, removed);
    removed
}

pub fn cut_orthogonal(volume: &Volume, z_start: usize, z_end: usize) -> Volume {
    let mut out = volume.clone();
    cut_orthogonal_in_place(&mut out, z_start, z_end);
    out
}

/// Zero every voxel with `z >= plane(x, y)`
pub fn cut_angled_in_place(volume: &mut Volume, plane: &CutPlane) -> usize {
    let mut removed = 0;
    for ((z, x, y), voxel) in volume.as_array_mut().indexed_iter_mut() {
        if *voxel != 0 && plane.removes(z, x, y) {
            *voxel = 0;
            removed += 1;
        }
    }

    log::debug!("Angled cut {:?} removed {} voxels", plane, removed);
    removed
}

pub fn cut_angled(volume: &Volume, plane: &CutPlane) -> Volume {
    let mut out = volume.clone();
    cut_angled_in_place(&mut out, plane);
    out
}

/// Copy of `volume` with every cut applied in order
pub fn apply_cuts(volume: &Volume, cuts: &[Cut]) -> Volume {
    let mut out = volume.clone();
    for cut in cuts {
        cut.apply(&mut out);
    }
    out
}
