//! Simulation configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cut::Cut;
use crate::error::{PhantomError, PhantomResult};
use crate::params::{BeamParams, PhantomParams};

/// Everything needed to reproduce one simulated exposure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Phantom geometry
    pub phantom: PhantomParams,

    /// Beam energy and source distance
    pub beam: BeamParams,

    /// Viewing angle in degrees
    pub angle_deg: f64,

    /// Cuts applied in order to the synthesized phantom
    pub cuts: Vec<Cut>,

    /// Preview slice (None = middle slice)
    pub slice_index: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            phantom: PhantomParams::default(),
            beam: BeamParams::default(),
            angle_deg: 0.0,
            cuts: Vec::new(),
            slice_index: None,
        }
    }
}

impl SimulationConfig {
    /// Soft, distant beam
    pub fn low_dose() -> Self {
        Self {
            beam: BeamParams::new(30.0, 200.0),
            ..Default::default()
        }
    }

    /// Hard, close beam
    pub fn high_energy() -> Self {
        Self {
            beam: BeamParams::new(150.0, 50.0),
            ..Default::default()
        }
    }

    /// Slice gap above mid height and an oblique fracture, both placed
    /// relative to the phantom geometry
    pub fn fractured() -> Self {
        Self {
            cuts: vec![Cut::default_split(), Cut::center_fracture()],
            ..Default::default()
        }
    }

    pub fn with_phantom(mut self, phantom: PhantomParams) -> Self {
        self.phantom = phantom;
        self
    }

    pub fn with_beam(mut self, beam: BeamParams) -> Self {
        self.beam = beam;
        self
    }

    pub fn with_angle(mut self, angle_deg: f64) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    pub fn with_cut(mut self, cut: Cut) -> Self {
        self.cuts.push(cut);
        self
    }

    pub fn with_slice_index(mut self, index: usize) -> Self {
        self.slice_index = Some(index);
        self
    }

    /// Slice used for previews and contrast
    pub fn effective_slice_index(&self) -> usize {
        self.slice_index.unwrap_or(self.phantom.height / 2)
    }

    pub fn validate(&self) -> PhantomResult<()> {
        self.phantom.validate()?;
        self.beam.validate()?;

        if !self.angle_deg.is_finite() {
            return Err(PhantomError::Config(format!(
                "angle_deg must be finite, got {}",
                self.angle_deg
            )));
        }
        for cut in &self.cuts {
            cut.validate()?;
        }
        match self.slice_index {
            Some(index) if index >= self.phantom.height => Err(PhantomError::Config(format!(
                "slice_index {} outside phantom height {}",
                index, self.phantom.height
            ))),
            _ => Ok(()),
        }
    }

    /// Parse and validate
    pub fn from_json_str(json: &str) -> PhantomResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> PhantomResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> PhantomResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PhantomResult<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
