//! Orthographic bone overlays.
//!
//! Draws every bone of a rig as a solid highlight-coloured segment on black,
//! seen from the front (image x = world X) or the side (image x = world Y),
//! with world Z pointing up in both. The output is what the bone detector
//! expects as input, so overlays double as synthetic test renders.

mod png_out;
mod project;
mod raster;

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use skelpose_core::{ColorChannel, JointHierarchy, RgbImage};

pub use png_out::write_png;
pub use project::{Framing, View};
pub use raster::{draw_segment, inset_segment};

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Png(#[from] png::EncodingError),
    #[error("image dimension {0} does not fit a PNG header")]
    TooLarge(usize),
}

/// Overlay rendering options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// Side of the square output image in pixels.
    pub resolution: u32,
    /// Framing margin around the rig's largest extent.
    pub margin: f64,
    /// Segment thickness in pixels.
    pub thickness: f64,
    /// Fraction of each bone trimmed off both ends, so touching bones stay
    /// separate blobs.
    pub inset: f64,
    pub highlight: ColorChannel,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            resolution: 1024,
            margin: 1.2,
            thickness: 6.0,
            inset: 0.0,
            highlight: ColorChannel::R,
        }
    }
}

/// One bone in world space.
pub type Segment = (Point3<f64>, Point3<f64>);

/// Rest-pose segments of every joint, in declaration order.
pub fn rest_segments(hierarchy: &JointHierarchy) -> Vec<Segment> {
    hierarchy.joints().iter().map(|j| (j.head, j.tail)).collect()
}

/// Render `segments` from `view`, framed on the segments themselves.
pub fn render_segments(segments: &[Segment], view: View, params: &OverlayParams) -> RgbImage {
    let framing = Framing::fit(
        segments.iter().flat_map(|&(h, t)| [h, t]),
        params.margin,
        params.resolution,
    );
    render_framed(segments, view, &framing, params)
}

/// Render `segments` with an explicit framing, so several poses share one
/// camera.
pub fn render_framed(
    segments: &[Segment],
    view: View,
    framing: &Framing,
    params: &OverlayParams,
) -> RgbImage {
    let side = framing.resolution as usize;
    let mut img = RgbImage::new(side, side);
    let rgb = params.highlight.pure_color();
    for (head, tail) in segments {
        let (a, b) = inset_segment(
            framing.project(view, head),
            framing.project(view, tail),
            params.inset,
        );
        draw_segment(&mut img, a, b, 0.5 * params.thickness, rgb);
    }
    debug!("{view:?} overlay: {} segments at {side}px", segments.len());
    img
}

/// Front and side rest-pose overlays of a rig.
pub fn render_rest_views(hierarchy: &JointHierarchy, params: &OverlayParams) -> [RgbImage; 2] {
    let segments = rest_segments(hierarchy);
    View::ALL.map(|view| render_segments(&segments, view, params))
}

/// Write `front.png` and `side.png` rest overlays into `dir`.
pub fn write_rest_views(
    hierarchy: &JointHierarchy,
    params: &OverlayParams,
    dir: impl AsRef<std::path::Path>,
) -> Result<Vec<std::path::PathBuf>, OverlayError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let images = render_rest_views(hierarchy, params);
    let mut written = Vec::with_capacity(2);
    for (view, img) in View::ALL.iter().zip(&images) {
        let path = dir.join(format!("{}.png", view.file_stem()));
        write_png(&path, img)?;
        written.push(path);
    }
    Ok(written)
}
