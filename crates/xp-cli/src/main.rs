//! XP command-line simulator
//!
//! Usage:
//!   xp synth                               - Phantom shape and tissue counts
//!   xp project --mode sum --out p.png      - Summation or attenuated projection
//!   xp preview --angle 30 --out s.png      - Rotated slice preview
//!   xp contrast                            - Bone / soft tissue contrast
//!   xp profile --slice 50 --y 50           - Label profile along rows
//!   xp analyze --angles 0,45,90            - Contrast plus multi-angle projections
//!   xp dump-config                         - Print the resolved configuration

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use xp_core::{
    Cut, SimulationConfig, SliceStats, TissueCounts, XraySession,
    analyze_contrast_and_angle, attenuation_profile, slice_stats,
};

#[derive(Parser)]
#[command(name = "xp", version, about = "X-ray leg phantom simulator")]
struct Cli {
    /// Simulation config (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a built-in preset instead of the defaults
    #[arg(long, global = true, value_enum, conflicts_with = "config")]
    preset: Option<Preset>,

    /// Soft tissue radius (voxels)
    #[arg(long, global = true)]
    leg_radius: Option<usize>,

    /// Bone radius (voxels)
    #[arg(long, global = true)]
    bone_radius: Option<usize>,

    /// Number of depth slices
    #[arg(long, global = true)]
    height: Option<usize>,

    /// Beam energy (keV)
    #[arg(long, global = true, allow_negative_numbers = true)]
    energy: Option<f64>,

    /// Source distance (cm)
    #[arg(long, global = true, allow_negative_numbers = true)]
    distance: Option<f64>,

    /// Remove depth slices START:END (repeatable)
    #[arg(long, global = true, value_parser = parse_split)]
    split: Vec<(usize, usize)>,

    /// Add an oblique fracture through the limb centre
    #[arg(long, global = true)]
    fracture: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the phantom and report its tissue counts
    Synth,
    /// Project the phantom to a 2D image
    Project {
        #[arg(short, long, value_enum, default_value = "attenuated")]
        mode: ProjectionMode,
        /// Viewing angle in degrees (sum mode, quarter turns)
        #[arg(short, long, allow_negative_numbers = true)]
        angle: Option<f64>,
        /// Output file (.png or .json)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Rotated, normalized single-slice preview
    Preview {
        /// Rotation in degrees
        #[arg(short, long, allow_negative_numbers = true)]
        angle: Option<f64>,
        #[arg(short, long)]
        slice: Option<usize>,
        /// Output file (.png or .json)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Bone / soft tissue contrast of one slice
    Contrast {
        #[arg(short, long)]
        slice: Option<usize>,
    },
    /// Label profile along rows at a fixed slice and column
    Profile {
        #[arg(short, long)]
        slice: Option<usize>,
        /// Column index (defaults to the centre column)
        #[arg(short, long)]
        y: Option<usize>,
    },
    /// Contrast plus summation projections at several angles
    Analyze {
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, default_values_t = vec![0.0, 90.0, 180.0, 270.0])]
        angles: Vec<f64>,
        #[arg(short, long)]
        slice: Option<usize>,
        /// Write each projection as PNG into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the resolved configuration as JSON
    DumpConfig {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProjectionMode {
    /// Label sums along depth
    Sum,
    /// Beer–Lambert transmitted intensity
    Attenuated,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    LowDose,
    HighEnergy,
    Fractured,
}

impl Preset {
    fn config(self) -> SimulationConfig {
        match self {
            Preset::LowDose => SimulationConfig::low_dose(),
            Preset::HighEnergy => SimulationConfig::high_energy(),
            Preset::Fractured => SimulationConfig::fractured(),
        }
    }
}

#[derive(Serialize)]
struct SynthReport {
    shape: [usize; 3],
    counts: TissueCounts,
}

#[derive(Serialize)]
struct ContrastReport {
    slice_index: usize,
    #[serde(flatten)]
    stats: SliceStats,
}

#[derive(Serialize)]
struct ProfileReport {
    slice_index: usize,
    column: usize,
    values: Vec<f64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    log::debug!("Resolved config: {:?}", config);

    match cli.command {
        Commands::Synth => synth(config),
        Commands::Project { mode, angle, out } => project(config, mode, angle, out),
        Commands::Preview { angle, slice, out } => preview(config, angle, slice, out),
        Commands::Contrast { slice } => contrast(config, slice),
        Commands::Profile { slice, y } => profile(config, slice, y),
        Commands::Analyze {
            angles,
            slice,
            out_dir,
        } => analyze(config, &angles, slice, out_dir),
        Commands::DumpConfig { out } => dump_config(&config, out),
    }
}

fn parse_split(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let start = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid split start '{}': {}", start, e))?;
    let end = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid split end '{}': {}", end, e))?;
    Ok((start, end))
}

/// Config file or preset, then command-line overrides, then cuts
fn resolve_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match (&cli.config, cli.preset) {
        (Some(path), _) => SimulationConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        (None, Some(preset)) => preset.config(),
        (None, None) => SimulationConfig::default(),
    };

    let phantom = &mut config.phantom;
    if let Some(radius) = cli.leg_radius {
        phantom.leg_radius = radius;
    }
    if let Some(radius) = cli.bone_radius {
        phantom.bone_radius = radius;
    }
    if let Some(height) = cli.height {
        phantom.height = height;
    }

    let beam = &mut config.beam;
    if let Some(energy) = cli.energy {
        beam.beam_energy = energy;
    }
    if let Some(distance) = cli.distance {
        beam.source_distance = distance;
    }

    for &(start, end) in &cli.split {
        config.cuts.push(Cut::orthogonal(start, end));
    }
    if cli.fracture {
        config.cuts.push(Cut::center_fracture());
    }

    config.validate().context("Invalid simulation parameters")?;
    Ok(config)
}

fn with_slice(mut config: SimulationConfig, slice: Option<usize>) -> Result<SimulationConfig> {
    if let Some(index) = slice {
        config.slice_index = Some(index);
        config.validate().context("Invalid slice index")?;
    }
    Ok(config)
}

fn synth(config: SimulationConfig) -> Result<()> {
    let mut session = XraySession::new(config)?;
    let phantom = session.phantom()?;
    let (depth, rows, cols) = phantom.shape();

    output::print_json(&SynthReport {
        shape: [depth, rows, cols],
        counts: phantom.tissue_counts(),
    })
}

fn project(
    config: SimulationConfig,
    mode: ProjectionMode,
    angle: Option<f64>,
    out: PathBuf,
) -> Result<()> {
    let mut session = XraySession::new(config)?;
    if let Some(angle) = angle {
        session.set_angle(angle)?;
    }

    let image = match mode {
        ProjectionMode::Sum => session.view_projection()?,
        ProjectionMode::Attenuated => session.xray_image()?,
    };
    output::write_image(&out, &image)
}

fn preview(
    config: SimulationConfig,
    angle: Option<f64>,
    slice: Option<usize>,
    out: PathBuf,
) -> Result<()> {
    let mut session = XraySession::new(with_slice(config, slice)?)?;
    if let Some(angle) = angle {
        session.set_angle(angle)?;
    }
    let image = session.preview()?;
    output::write_image(&out, &image)
}

fn contrast(config: SimulationConfig, slice: Option<usize>) -> Result<()> {
    let config = with_slice(config, slice)?;
    let slice_index = config.effective_slice_index();
    let mut session = XraySession::new(config)?;
    let stats = slice_stats(session.phantom()?.slice(slice_index)?);

    output::print_json(&ContrastReport { slice_index, stats })
}

fn profile(config: SimulationConfig, slice: Option<usize>, y: Option<usize>) -> Result<()> {
    let config = with_slice(config, slice)?;
    let slice_index = config.effective_slice_index();
    let column = y.unwrap_or(config.phantom.leg_radius);
    let mut session = XraySession::new(config)?;

    let values = attenuation_profile(session.phantom()?, slice_index, column)?;
    output::print_json(&ProfileReport {
        slice_index,
        column,
        values: values.to_vec(),
    })
}

fn analyze(
    config: SimulationConfig,
    angles: &[f64],
    slice: Option<usize>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    if angles.is_empty() {
        bail!("At least one angle is required");
    }

    let config = with_slice(config, slice)?;
    let slice_index = config.effective_slice_index();
    let mut session = XraySession::new(config)?;
    let analysis = analyze_contrast_and_angle(session.phantom()?, slice_index, angles)?;

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for projection in &analysis.projections {
            let path = dir.join(format!("projection_{}.png", projection.angle_deg));
            output::write_image(&path, &projection.image)?;
        }
    }

    output::print_json(&analysis.summary())
}

fn dump_config(config: &SimulationConfig, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => config
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => output::print_json(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xp_core::PhantomParams;

    #[test]
    fn test_parse_split() {
        assert_eq!(parse_split("55:65"), Ok((55, 65)));
        assert_eq!(parse_split(" 3 : 9 "), Ok((3, 9)));
        assert!(parse_split("55").is_err());
        assert!(parse_split("a:2").is_err());
        assert!(parse_split("-1:2").is_err());
    }

    #[test]
    fn test_overrides_and_cuts() {
        let cli = Cli::parse_from([
            "xp",
            "--leg-radius",
            "30",
            "--bone-radius",
            "10",
            "--energy",
            "80",
            "--split",
            "10:20",
            "--fracture",
            "synth",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.phantom, PhantomParams::new(30, 10, 100));
        assert_eq!(config.beam.beam_energy, 80.0);
        assert_eq!(config.beam.source_distance, 100.0);
        assert_eq!(config.cuts.len(), 2);
        assert_eq!(config.cuts[0], Cut::orthogonal(10, 20));
        assert_eq!(config.cuts[1], Cut::center_fracture());
    }

    #[test]
    fn test_fractured_preset_follows_geometry_overrides() {
        let cli = Cli::parse_from([
            "xp",
            "--preset",
            "fractured",
            "--leg-radius",
            "30",
            "--bone-radius",
            "10",
            "--height",
            "40",
            "synth",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.phantom, PhantomParams::new(30, 10, 40));
        assert_eq!(
            config.cuts[0].resolve(config.phantom.shape()),
            Cut::orthogonal(25, 35)
        );

        let mut session = XraySession::new(config).unwrap();
        let original = session.original().unwrap().tissue_counts();
        let working = session.phantom().unwrap().tissue_counts();
        assert!(
            working.occupied() < original.occupied(),
            "preset cuts must remove tissue on the resized phantom"
        );
    }

    #[test]
    fn test_preset_and_config_file() {
        let cli = Cli::parse_from(["xp", "--preset", "high-energy", "contrast"]);
        assert_eq!(resolve_config(&cli).unwrap().beam.beam_energy, 150.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        SimulationConfig::low_dose().with_angle(45.0).save(&path).unwrap();

        let cli = Cli::parse_from([
            "xp",
            "--config",
            path.to_str().unwrap(),
            "--distance",
            "150",
            "synth",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.beam.beam_energy, 30.0);
        assert_eq!(config.beam.source_distance, 150.0);
        assert_eq!(config.angle_deg, 45.0);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let cli = Cli::parse_from(["xp", "--bone-radius", "60", "synth"]);
        assert!(resolve_config(&cli).is_err());

        let cli = Cli::parse_from(["xp", "--energy", "-3", "synth"]);
        assert!(resolve_config(&cli).is_err());

        // Negative distance reaches validation instead of failing to parse
        let cli = Cli::try_parse_from(["xp", "--distance", "-5", "synth"]).unwrap();
        assert_eq!(cli.distance, Some(-5.0));
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_slice_override_validated() {
        assert!(with_slice(SimulationConfig::default(), Some(99)).is_ok());
        assert!(with_slice(SimulationConfig::default(), Some(100)).is_err());
    }

    #[test]
    fn test_project_and_analyze_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimulationConfig::default().with_phantom(PhantomParams::new(8, 3, 10));

        let out = dir.path().join("xray.json");
        project(config.clone(), ProjectionMode::Attenuated, None, out.clone()).unwrap();
        assert!(out.exists());

        let out = dir.path().join("preview.png");
        preview(config.clone(), Some(30.0), Some(2), out.clone()).unwrap();
        assert!(out.exists());

        let frames = dir.path().join("frames");
        analyze(config, &[0.0, 90.0], None, Some(frames.clone())).unwrap();
        assert!(frames.join("projection_0.png").exists());
        assert!(frames.join("projection_90.png").exists());
    }
}
