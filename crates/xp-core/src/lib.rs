//! XP-Core: Leg Phantom X-ray Simulation
//!
//! Synthetic radiography of a cylindrical leg phantom:
//! - Volume synthesis (soft tissue cylinder with a bone core)
//! - Orthogonal and angled cuts simulating slice loss and fractures
//! - Summation and Beer–Lambert projections
//! - Rotated single-slice previews
//! - Bone / soft tissue contrast metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          XraySession                              │
//! │                                                                   │
//! │  ┌────────────┐   ┌─────────────┐   ┌─────────────┐   ┌────────┐ │
//! │  │ Synthesize │ → │ Cuts        │ → │ Projection  │ → │ Image  │ │
//! │  │ (params)   │   │ (orth/tilt) │   │ (sum / B-L) │   │ (2D)   │ │
//! │  └────────────┘   └─────────────┘   └─────────────┘   └────────┘ │
//! │                          │                                        │
//! │                          ↓                                        │
//! │                   ┌─────────────┐   ┌──────────────────────────┐  │
//! │                   │ Slice       │ → │ Metrics / Analysis       │  │
//! │                   │ preview     │   │ (contrast, rayon angles) │  │
//! │                   └─────────────┘   └──────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xp_core::{PhantomParams, cut_orthogonal, project_attenuated, synthesize};
//!
//! let phantom = synthesize(&PhantomParams::default())?;
//! let split = cut_orthogonal(&phantom, 55, 65);
//! let image = project_attenuated(&split, 50.0, 100.0)?;
//! ```

mod analysis;
mod config;
mod cut;
mod error;
mod metrics;
mod params;
mod projection;
mod rotate;
mod session;
mod synth;
mod volume;

pub use analysis::*;
pub use config::*;
pub use cut::*;
pub use error::*;
pub use metrics::*;
pub use params::*;
pub use projection::*;
pub use rotate::*;
pub use session::*;
pub use synth::*;
pub use volume::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
