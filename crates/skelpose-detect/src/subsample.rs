//! Reduced-accuracy fallback: one point per occupied grid cell.

use nalgebra::Point2;

use crate::backend::DetectionBackend;
use crate::mask::BinaryMask;

/// Subsamples the mask onto a coarse grid of `cell_px`-sized cells and emits
/// the mean foreground position of every occupied cell, cells in raster order.
///
/// Unlike [`ComponentBackend`](crate::ComponentBackend) this does not separate
/// segments, so a long bone yields several points.
#[derive(Clone, Debug)]
pub struct GridSubsampleBackend {
    cell_px: usize,
}

impl GridSubsampleBackend {
    pub fn new(cell_px: u32) -> Self {
        Self {
            cell_px: (cell_px as usize).max(1),
        }
    }
}

impl DetectionBackend for GridSubsampleBackend {
    fn name(&self) -> &'static str {
        "grid-subsample"
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn extract(&self, mask: &BinaryMask) -> Vec<Point2<f32>> {
        let s = self.cell_px;
        let cells_x = mask.width.div_ceil(s);
        let cells_y = mask.height.div_ceil(s);
        let mut out = Vec::new();

        for cy in 0..cells_y {
            for cx in 0..cells_x {
                let (mut n, mut sx, mut sy) = (0usize, 0f64, 0f64);
                for y in cy * s..((cy + 1) * s).min(mask.height) {
                    for x in cx * s..((cx + 1) * s).min(mask.width) {
                        if mask.get(x, y) {
                            n += 1;
                            sx += x as f64;
                            sy += y as f64;
                        }
                    }
                }
                if n > 0 {
                    out.push(Point2::new(
                        (sx / n as f64 + 0.5) as f32,
                        (sy / n as f64 + 0.5) as f32,
                    ));
                }
            }
        }

        out
    }
}
