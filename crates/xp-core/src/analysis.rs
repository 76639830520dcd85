//! Contrast and multi-angle projection analysis

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, PhantomResult};
use crate::metrics::{SliceStats, slice_stats};
use crate::projection::{Image2D, project_sum};
use crate::rotate::quarter_turns;
use crate::volume::Volume;

/// Summation projection at one requested angle
#[derive(Debug, Clone)]
pub struct AngleProjection {
    pub angle_deg: f64,
    pub image: Image2D,
}

/// Result of [`analyze_contrast_and_angle`]
#[derive(Debug, Clone)]
pub struct AngleAnalysis {
    /// Depth index the contrast was measured on
    pub slice_index: usize,
    pub stats: SliceStats,
    /// One projection per requested angle, in request order
    pub projections: Vec<AngleProjection>,
}

/// Value range of one projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub angle_deg: f64,
    pub quarter_turns: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Serializable digest of an [`AngleAnalysis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub slice_index: usize,
    pub contrast: f64,
    pub stats: SliceStats,
    pub projections: Vec<ProjectionSummary>,
}

impl AngleAnalysis {
    pub fn contrast(&self) -> f64 {
        self.stats.contrast
    }

    /// Projection for the first requested angle equal to `angle_deg`
    pub fn projection_for(&self, angle_deg: f64) -> Option<&Image2D> {
        self.projections
            .iter()
            .find(|p| p.angle_deg == angle_deg)
            .map(|p| &p.image)
    }

    pub fn summary(&self) -> AnalysisSummary {
        let projections = self
            .projections
            .iter()
            .map(|p| {
                let min = p.image.iter().copied().fold(f64::INFINITY, f64::min);
                let max = p.image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = p.image.mean().unwrap_or(0.0);
                ProjectionSummary {
                    angle_deg: p.angle_deg,
                    quarter_turns: quarter_turns(p.angle_deg),
                    min: if p.image.is_empty() { 0.0 } else { min },
                    max: if p.image.is_empty() { 0.0 } else { max },
                    mean,
                }
            })
            .collect();

        AnalysisSummary {
            slice_index: self.slice_index,
            contrast: self.contrast(),
            stats: self.stats,
            projections,
        }
    }
}

/// Contrast of slice `slice_index` plus a summation projection per angle.
///
/// Projections are computed in parallel and returned in the order of
/// `angles`.
pub fn analyze_contrast_and_angle(
    volume: &Volume,
    slice_index: usize,
    angles: &[f64],
) -> PhantomResult<AngleAnalysis> {
    if let Some(bad) = angles.iter().find(|a| !a.is_finite()) {
        return Err(PhantomError::invalid(format!("angle must be finite, got {}", bad)));
    }

    let stats = slice_stats(volume.slice(slice_index)?);

    let projections: Vec<AngleProjection> = angles
        .par_iter()
        .map(|&angle_deg| AngleProjection {
            angle_deg,
            image: project_sum(volume, angle_deg),
        })
        .collect();

    log::info!(
        "Analyzed slice {}: contrast {:.3}, {} projection(s)",
        slice_index,
        stats.contrast,
        projections.len()
    );

    Ok(AngleAnalysis {
        slice_index,
        stats,
        projections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PhantomParams;
    use crate::rotate::rot90;
    use crate::synth::synthesize;

    fn phantom() -> Volume {
        synthesize(&PhantomParams::new(6, 2, 8)).unwrap()
    }

    #[test]
    fn test_projections_in_request_order() {
        let volume = phantom();
        let angles = [270.0, 0.0, 90.0, 45.0, 180.0];
        let analysis = analyze_contrast_and_angle(&volume, 4, &angles).unwrap();

        assert_eq!(analysis.projections.len(), angles.len());
        for (projection, &angle) in analysis.projections.iter().zip(&angles) {
            assert_eq!(projection.angle_deg, angle);
            assert_eq!(projection.image, project_sum(&volume, angle));
        }
        assert_eq!(analysis.contrast(), 1.0);
    }

    #[test]
    fn test_projection_lookup() {
        let volume = phantom();
        let analysis = analyze_contrast_and_angle(&volume, 0, &[0.0, 90.0]).unwrap();
        let straight = analysis.projection_for(0.0).unwrap();
        let turned = analysis.projection_for(90.0).unwrap();
        assert_eq!(turned, &rot90(straight.view(), 1));
        assert!(analysis.projection_for(30.0).is_none());
    }

    #[test]
    fn test_summary() {
        let volume = phantom();
        let analysis = analyze_contrast_and_angle(&volume, 2, &[135.0]).unwrap();
        let summary = analysis.summary();

        assert_eq!(summary.slice_index, 2);
        assert_eq!(summary.contrast, 1.0);
        let projection = summary.projections[0];
        assert_eq!(projection.quarter_turns, 1);
        assert_eq!(projection.min, 0.0);
        assert_eq!(projection.max, 16.0);
        assert!(projection.mean > 0.0 && projection.mean < 16.0);

        let json = serde_json::to_string(&summary).unwrap();
        let back: AnalysisSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stats, summary.stats);
        assert_eq!(back.projections[0].max, 16.0);
        approx::assert_relative_eq!(back.projections[0].mean, projection.mean, epsilon = 1e-9);
    }

    #[test]
    fn test_no_angles() {
        let analysis = analyze_contrast_and_angle(&phantom(), 1, &[]).unwrap();
        assert!(analysis.projections.is_empty());
        assert!(analysis.summary().projections.is_empty());
    }

    #[test]
    fn test_rejects_bad_input() {
        let volume = phantom();
        assert!(matches!(
            analyze_contrast_and_angle(&volume, 8, &[0.0]),
            Err(PhantomError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            analyze_contrast_and_angle(&volume, 0, &[0.0, f64::NAN]),
            Err(PhantomError::InvalidParameter(_))
        ));
    }
}
