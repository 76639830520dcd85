//! Geometric and beam parameters

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, PhantomResult};
use crate::volume::Tissue;

/// Beam energies the simulator is tuned for (keV)
pub const ENERGY_RANGE_KEV: RangeInclusive<f64> = 30.0..=150.0;

/// Source distances the simulator is tuned for (cm)
pub const DISTANCE_RANGE_CM: RangeInclusive<f64> = 50.0..=200.0;

/// Leg phantom geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PhantomParams {
    /// Radius of the soft tissue cylinder (voxels)
    pub leg_radius: usize,
    /// Radius of the bone core (voxels)
    pub bone_radius: usize,
    /// Number of depth slices
    pub height: usize,
}

impl Default for PhantomParams {
    fn default() -> Self {
        Self {
            leg_radius: 50,
            bone_radius: 20,
            height: 100,
        }
    }
}

impl PhantomParams {
    pub fn new(leg_radius: usize, bone_radius: usize, height: usize) -> Self {
        Self {
            leg_radius,
            bone_radius,
            height,
        }
    }

    /// Lateral size of the volume (rows == columns)
    pub fn width(&self) -> usize {
        2 * self.leg_radius
    }

    /// Volume shape as (depth, rows, columns)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width(), self.width())
    }

    pub fn with_leg_radius(mut self, radius: usize) -> Self {
        self.leg_radius = radius;
        self
    }

    pub fn with_bone_radius(mut self, radius: usize) -> Self {
        self.bone_radius = radius;
        self
    }

    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    /// Requires positive dimensions and `bone_radius < leg_radius`.
    pub fn validate(&self) -> PhantomResult<()> {
        if self.leg_radius == 0 {
            return Err(PhantomError::invalid("leg_radius must be positive"));
        }
        if self.bone_radius == 0 {
            return Err(PhantomError::invalid("bone_radius must be positive"));
        }
        if self.height == 0 {
            return Err(PhantomError::invalid("height must be positive"));
        }
        if self.bone_radius >= self.leg_radius {
            return Err(PhantomError::InvalidParameter(format!(
                "bone_radius ({}) must be smaller than leg_radius ({})",
                self.bone_radius, self.leg_radius
            )));
        }
        Ok(())
    }
}

/// X-ray beam settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamParams {
    /// Tube energy (keV)
    pub beam_energy: f64,
    /// Source to detector distance (cm)
    pub source_distance: f64,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            beam_energy: 50.0,
            source_distance: 100.0,
        }
    }
}

impl BeamParams {
    pub fn new(beam_energy: f64, source_distance: f64) -> Self {
        Self {
            beam_energy,
            source_distance,
        }
    }

    pub fn with_energy(mut self, kev: f64) -> Self {
        self.beam_energy = kev;
        self
    }

    pub fn with_distance(mut self, cm: f64) -> Self {
        self.source_distance = cm;
        self
    }

    /// Both values must be finite and strictly positive.
    ///
    /// Values outside the tuned ranges are accepted with a warning.
    pub fn validate(&self) -> PhantomResult<()> {
        if !self.beam_energy.is_finite() || self.beam_energy <= 0.0 {
            return Err(PhantomError::InvalidParameter(format!(
                "beam_energy must be finite and positive, got {}",
                self.beam_energy
            )));
        }
        if !self.source_distance.is_finite() || self.source_distance <= 0.0 {
            return Err(PhantomError::InvalidParameter(format!(
                "source_distance must be finite and positive, got {}",
                self.source_distance
            )));
        }
        if !ENERGY_RANGE_KEV.contains(&self.beam_energy) {
            log::warn!(
                "Beam energy {} keV outside tuned range {:?}",
                self.beam_energy,
                ENERGY_RANGE_KEV
            );
        }
        if !DISTANCE_RANGE_CM.contains(&self.source_distance) {
            log::warn!(
                "Source distance {} cm outside tuned range {:?}",
                self.source_distance,
                DISTANCE_RANGE_CM
            );
        }
        Ok(())
    }

    /// Linear attenuation per bone voxel at this energy
    pub fn bone_attenuation(&self) -> f64 {
        0.5 + (self.beam_energy / 100.0) * 0.5
    }

    /// Linear attenuation per soft tissue voxel at this energy
    pub fn tissue_attenuation(&self) -> f64 {
        0.2 + (self.beam_energy / 100.0) * 0.3
    }

    pub fn attenuation_of(&self, tissue: Tissue) -> f64 {
        match tissue {
            Tissue::Bone => self.bone_attenuation(),
            Tissue::SoftTissue => self.tissue_attenuation(),
            Tissue::Background => 0.0,
        }
    }

    /// Intensity gain applied to single-slice previews
    pub fn slice_gain(&self) -> f64 {
        (self.beam_energy / 100.0) * (200.0 / self.source_distance)
    }
}
