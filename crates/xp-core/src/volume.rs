//! Labeled phantom volume indexed by (depth, row, column)

use ndarray::{Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, PhantomResult};

/// Tissue class stored in every voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tissue {
    /// Air around the limb
    Background = 0,
    /// Muscle and fat ring
    SoftTissue = 1,
    /// Bone core
    Bone = 2,
}

impl Default for Tissue {
    fn default() -> Self {
        Self::Background
    }
}

impl Tissue {
    pub const ALL: [Tissue; 3] = [Tissue::Background, Tissue::SoftTissue, Tissue::Bone];

    /// Voxel value for this class
    pub fn label(self) -> u8 {
        self as u8
    }

    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Self::Background),
            1 => Some(Self::SoftTissue),
            2 => Some(Self::Bone),
            _ => None,
        }
    }
}

/// Voxel totals per tissue class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TissueCounts {
    pub background: usize,
    pub soft_tissue: usize,
    pub bone: usize,
}

impl TissueCounts {
    pub fn total(&self) -> usize {
        self.background + self.soft_tissue + self.bone
    }

    /// Non-background voxels
    pub fn occupied(&self) -> usize {
        self.soft_tissue + self.bone
    }
}

/// Dense tissue-label volume.
///
/// Every voxel holds one of the [`Tissue`] labels. Mutating operations take
/// `&mut self`; clone first to keep the previous state around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    data: Array3<u8>,
}

impl Volume {
    /// All-background volume of the given shape
    pub fn empty(depth: usize, rows: usize, cols: usize) -> Self {
        Self {
            data: Array3::zeros((depth, rows, cols)),
        }
    }

    /// Wrap an existing label array, rejecting values outside the tissue set
    pub fn from_labels(data: Array3<u8>) -> PhantomResult<Self> {
        if let Some(&bad) = data.iter().find(|&&v| Tissue::from_label(v).is_none()) {
            return Err(PhantomError::InvalidLabel(bad));
        }
        Ok(Self { data })
    }

    pub(crate) fn from_labels_unchecked(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// (depth, rows, columns)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn depth(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn rows(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn cols(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Shape of a single depth slice
    pub fn lateral_shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn get(&self, z: usize, x: usize, y: usize) -> Option<u8> {
        self.data.get((z, x, y)).copied()
    }

    /// Tissue at a voxel; positions outside the grid are background
    pub fn tissue_at(&self, z: usize, x: usize, y: usize) -> Tissue {
        self.get(z, x, y)
            .and_then(Tissue::from_label)
            .unwrap_or_default()
    }

    /// View of depth slice `z`
    pub fn slice(&self, z: usize) -> PhantomResult<ArrayView2<'_, u8>> {
        self.check_depth(z)?;
        Ok(self.data.index_axis(Axis(0), z))
    }

    pub fn slice_owned(&self, z: usize) -> PhantomResult<Array2<u8>> {
        Ok(self.slice(z)?.to_owned())
    }

    /// Overwrite depth slice `z` with `slice`
    pub fn write_slice(&mut self, z: usize, slice: ArrayView2<'_, u8>) -> PhantomResult<()> {
        self.check_depth(z)?;
        if slice.dim() != self.lateral_shape() {
            return Err(PhantomError::DimensionMismatch {
                expected: self.lateral_shape(),
                got: slice.dim(),
            });
        }
        if let Some(&bad) = slice.iter().find(|&&v| Tissue::from_label(v).is_none()) {
            return Err(PhantomError::InvalidLabel(bad));
        }
        self.data.index_axis_mut(Axis(0), z).assign(&slice);
        Ok(())
    }

    pub fn count(&self, tissue: Tissue) -> usize {
        let label = tissue.label();
        self.data.iter().filter(|&&v| v == label).count()
    }

    /// Background voxels, including everything removed by cuts
    pub fn count_zeroed(&self) -> usize {
        self.count(Tissue::Background)
    }

    pub fn tissue_counts(&self) -> TissueCounts {
        let mut counts = TissueCounts::default();
        for &v in self.data.iter() {
            match Tissue::from_label(v) {
                Some(Tissue::Bone) => counts.bone += 1,
                Some(Tissue::SoftTissue) => counts.soft_tissue += 1,
                _ => counts.background += 1,
            }
        }
        counts
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub(crate) fn as_array_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    fn check_depth(&self, z: usize) -> PhantomResult<()> {
        if z >= self.depth() {
            return Err(PhantomError::IndexOutOfBounds {
                axis: "depth",
                index: z,
                len: self.depth(),
            });
        }
        Ok(())
    }
}
