//! Bone pixel detector.
//!
//! Given one RGB render where skeleton segments are drawn in a solid
//! highlight colour, produce an ordered list of points marking those
//! segments:
//!
//! 1. Select one colour channel and threshold it into a binary mask.
//! 2. Hand the mask to a [`DetectionBackend`]:
//!    - [`ComponentBackend`] (feature `components`, default): one centroid per
//!      8-connected component, in raster order of each component's first pixel.
//!    - [`GridSubsampleBackend`]: one point per occupied coarse grid cell. A
//!      reduced-accuracy fallback, not an error path.
//!
//! ## Quickstart
//!
//! ```
//! use skelpose_core::{ColorChannel, RgbImage};
//! use skelpose_detect::detect;
//!
//! let mut img = RgbImage::new(8, 8);
//! img.put_pixel(3, 3, [255, 0, 0]);
//! let det = detect(&img.view(), ColorChannel::R, 100);
//! assert_eq!(det.len(), 1);
//! ```

mod backend;
#[cfg(feature = "components")]
mod components;
mod detector;
mod mask;
mod params;
mod subsample;
mod threshold;

pub use backend::{components_available, select_backend, DetectionBackend};
#[cfg(feature = "components")]
pub use components::{label_components, ComponentBackend, ComponentStats};
pub use detector::{detect, BoneDetector};
pub use mask::BinaryMask;
pub use params::{BackendChoice, DetectParams, ThresholdMode};
pub use subsample::GridSubsampleBackend;
