use nalgebra::Point2;

use crate::mask::BinaryMask;
use crate::{BackendChoice, DetectParams};

#[cfg(feature = "components")]
use crate::components::ComponentBackend;
use crate::subsample::GridSubsampleBackend;

/// Turns a foreground mask into an ordered list of representative points.
///
/// Implementations must be deterministic: the same mask always yields the
/// same points in the same order. Points use the pixel-centre convention
/// (pixel `(i, j)` covers `[i, i+1) x [j, j+1)`, its centre is `(i+0.5, j+0.5)`).
pub trait DetectionBackend: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Whether this backend is the reduced-accuracy fallback.
    fn is_fallback(&self) -> bool {
        false
    }

    fn extract(&self, mask: &BinaryMask) -> Vec<Point2<f32>>;
}

/// True when the connected-component backend was compiled in.
pub const fn components_available() -> bool {
    cfg!(feature = "components")
}

/// Build the backend requested by `params`, falling back to grid
/// subsampling when connected components are not available.
pub fn select_backend(params: &DetectParams) -> Box<dyn DetectionBackend> {
    match params.backend {
        BackendChoice::Subsample => Box::new(GridSubsampleBackend::new(params.grid_cell_px)),
        BackendChoice::Auto | BackendChoice::Components => preferred_backend(params),
    }
}

#[cfg(feature = "components")]
fn preferred_backend(params: &DetectParams) -> Box<dyn DetectionBackend> {
    Box::new(ComponentBackend::new(params.min_component_px))
}

#[cfg(not(feature = "components"))]
fn preferred_backend(params: &DetectParams) -> Box<dyn DetectionBackend> {
    if params.backend == BackendChoice::Components {
        log::warn!("connected components not compiled in, using grid subsampling");
    }
    Box::new(GridSubsampleBackend::new(params.grid_cell_px))
}
