//! Pose extraction pipeline.
//!
//! This module wires together per-image detection, dual-view reconstruction
//! for the rest and target configurations, joint correspondence, rotation
//! solving and the final write onto the rig.

mod error;
mod params;
#[allow(clippy::module_inception)]
mod pipeline;
mod result;

pub use error::PoseError;
pub use params::PoseParams;
pub use pipeline::{PoseDetections, PoseExtractor, PoseSolution, PoseViews};
pub use result::{Degradation, Diagnostics, ProcessingResult, ViewCounts, ViewKind};
