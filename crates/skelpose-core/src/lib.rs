//! Core types for two-view skeleton pose recovery.
//!
//! This crate is intentionally small: raster views, point types, the rig's
//! joint hierarchy and a logger. It does *not* detect, reconstruct or pose
//! anything.

mod geometry;
mod hierarchy;
mod image;
mod logger;

pub use geometry::{Detection, JointPositionPair, NormalizationBounds, NormalizedPoint3};
pub use hierarchy::{HierarchyError, HierarchySpec, Joint, JointHierarchy, JointSpec};
pub use image::{ColorChannel, ImageError, RgbImage, RgbImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, verbosity_level};
