//! Interactive simulation session
//!
//! Holds a [`SimulationConfig`] and lazily caches the synthesized phantom
//! together with a working copy that accumulates cuts. Only phantom
//! geometry changes force a new synthesis; every other setting reuses the
//! cached volumes.

use crate::config::SimulationConfig;
use crate::cut::{Cut, apply_cuts};
use crate::error::{PhantomError, PhantomResult};
use crate::metrics::contrast_at;
use crate::params::{BeamParams, PhantomParams};
use crate::projection::{Image2D, adjust_slice, project_attenuated_with, project_sum};
use crate::synth::synthesize;
use crate::volume::Volume;

#[derive(Debug, Clone)]
struct PhantomCache {
    /// Uncut phantom
    original: Volume,
    /// Phantom with every configured cut applied
    working: Volume,
}

/// Cached phantom plus the parameters that produced it
#[derive(Debug, Clone)]
pub struct XraySession {
    config: SimulationConfig,
    cache: Option<PhantomCache>,
}

impl Default for XraySession {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            cache: None,
        }
    }
}

impl XraySession {
    pub fn new(config: SimulationConfig) -> PhantomResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: None,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    fn cache(&mut self) -> PhantomResult<&mut PhantomCache> {
        let cache = match self.cache.take() {
            Some(cache) => {
                log::debug!("Phantom cache hit");
                cache
            }
            None => {
                log::debug!("Phantom cache miss, synthesizing {:?}", self.config.phantom);
                let original = synthesize(&self.config.phantom)?;
                let working = apply_cuts(&original, &self.config.cuts);
                PhantomCache { original, working }
            }
        };
        Ok(self.cache.insert(cache))
    }

    /// Phantom with all session cuts applied
    pub fn phantom(&mut self) -> PhantomResult<&Volume> {
        Ok(&self.cache()?.working)
    }

    /// Phantom before any cut
    pub fn original(&mut self) -> PhantomResult<&Volume> {
        Ok(&self.cache()?.original)
    }

    /// Replace phantom geometry, dropping the cache if it changed
    pub fn set_phantom_params(&mut self, params: PhantomParams) -> PhantomResult<()> {
        params.validate()?;
        if params != self.config.phantom {
            self.config.phantom = params;
            if self.config.slice_index.is_some_and(|z| z >= params.height) {
                self.config.slice_index = None;
            }
            self.cache = None;
        }
        Ok(())
    }

    pub fn set_beam(&mut self, beam: BeamParams) -> PhantomResult<()> {
        beam.validate()?;
        self.config.beam = beam;
        Ok(())
    }

    pub fn set_angle(&mut self, angle_deg: f64) -> PhantomResult<()> {
        if !angle_deg.is_finite() {
            return Err(PhantomError::invalid(format!(
                "angle must be finite, got {}",
                angle_deg
            )));
        }
        self.config.angle_deg = angle_deg;
        Ok(())
    }

    /// Apply `cut` to the working phantom, returning the voxels removed
    pub fn apply_cut(&mut self, cut: Cut) -> PhantomResult<usize> {
        cut.validate()?;
        let removed = cut.apply(&mut self.cache()?.working);
        self.config.cuts.push(cut);
        Ok(removed)
    }

    /// Drop all cuts and restore the working phantom
    pub fn reset_cuts(&mut self) {
        self.config.cuts.clear();
        if let Some(cache) = self.cache.as_mut() {
            cache.working = cache.original.clone();
        }
    }

    pub fn angle_deg(&self) -> f64 {
        self.config.angle_deg
    }

    /// [`preview_slice`](Self::preview_slice) at the session angle
    pub fn preview(&mut self) -> PhantomResult<Image2D> {
        self.preview_slice(self.config.angle_deg)
    }

    /// [`sum_projection`](Self::sum_projection) at the session angle
    pub fn view_projection(&mut self) -> PhantomResult<Image2D> {
        self.sum_projection(self.config.angle_deg)
    }

    /// Normalized preview of the configured slice at `angle_deg`
    pub fn preview_slice(&mut self, angle_deg: f64) -> PhantomResult<Image2D> {
        let index = self.config.effective_slice_index();
        let beam = self.config.beam;
        let phantom = self.phantom()?;
        adjust_slice(
            phantom.slice(index)?,
            angle_deg,
            beam.beam_energy,
            beam.source_distance,
        )
    }

    /// Transmitted intensity of the working phantom
    pub fn xray_image(&mut self) -> PhantomResult<Image2D> {
        let beam = self.config.beam;
        project_attenuated_with(self.phantom()?, &beam)
    }

    pub fn sum_projection(&mut self, angle_deg: f64) -> PhantomResult<Image2D> {
        Ok(project_sum(self.phantom()?, angle_deg))
    }

    /// Contrast of the configured slice of the working phantom
    pub fn contrast(&mut self) -> PhantomResult<f64> {
        let index = self.config.effective_slice_index();
        contrast_at(self.phantom()?, index)
    }
}
