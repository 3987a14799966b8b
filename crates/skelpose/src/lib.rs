//! Facade crate for the `skelpose-*` workspace.
//!
//! Recovers the pose of a skeletal rig from four renders: the rig seen from
//! the front and from the side, once in its rest configuration and once in
//! the target configuration. Skeleton segments must be drawn in a solid
//! highlight colour (pure red by default).
//!
//! This crate provides:
//! - re-exports of the underlying crates
//! - (feature `image`) helpers that load renders from disk and run the whole
//!   pipeline
//! - (feature `cli`) the `skelpose` binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use skelpose::load::process_image_files;
//! use skelpose::pose::{io::load_rig, PoseParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rig = load_rig("rig.json")?;
//! let result = process_image_files(
//!     ["front_rest.png", "side_rest.png", "front_target.png", "side_target.png"],
//!     &mut rig,
//!     &PoseParams::default(),
//! )?;
//! println!("{}", result.diagnostics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `skelpose::core`: images, point types, joint hierarchy, logger.
//! - `skelpose::detect`: bone pixel detection.
//! - `skelpose::pose`: reconstruction, correspondence, rotation solving, rig
//!   application and the pipeline.
//! - `skelpose::overlay`: front/side bone overlays and PNG output.
//! - `skelpose::load` (feature `image`): file loading and end-to-end helpers.

pub use skelpose_core as core;
pub use skelpose_detect as detect;
pub use skelpose_overlay as overlay;
pub use skelpose_pose as pose;

pub use skelpose_core::{ColorChannel, Detection, JointHierarchy, RgbImage};
pub use skelpose_pose::{
    ArmatureRig, PoseExtractor, PoseParams, PoseRig, ProcessingResult, RotationMap,
};

#[cfg(feature = "image")]
pub mod load;
