//! Exhaustive 8-connected component extraction.

use std::collections::VecDeque;

use nalgebra::Point2;

use crate::backend::DetectionBackend;
use crate::mask::BinaryMask;

/// One centroid per 8-connected foreground component.
///
/// Components are reported in the raster order (top-to-bottom,
/// left-to-right) of their first pixel.
#[derive(Clone, Debug)]
pub struct ComponentBackend {
    min_pixels: usize,
}

impl ComponentBackend {
    pub fn new(min_pixels: usize) -> Self {
        Self {
            min_pixels: min_pixels.max(1),
        }
    }
}

/// Pixel statistics of one component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComponentStats {
    pub pixels: usize,
    pub centroid: Point2<f32>,
    /// Inclusive bounding box `[x0, y0, x1, y1]`.
    pub bbox: [usize; 4],
}

/// Label every 8-connected component of `mask` in raster-discovery order.
pub fn label_components(mask: &BinaryMask) -> Vec<ComponentStats> {
    let (w, h) = (mask.width, mask.height);
    let mut visited = vec![false; w * h];
    let mut queue = VecDeque::new();
    let mut out = Vec::new();

    for y0 in 0..h {
        for x0 in 0..w {
            let idx0 = y0 * w + x0;
            if visited[idx0] || !mask.data[idx0] {
                continue;
            }
            visited[idx0] = true;
            queue.push_back((x0, y0));

            let mut count = 0usize;
            let (mut sx, mut sy) = (0f64, 0f64);
            let mut bbox = [x0, y0, x0, y0];

            while let Some((x, y)) = queue.pop_front() {
                count += 1;
                sx += x as f64;
                sy += y as f64;
                bbox[0] = bbox[0].min(x);
                bbox[1] = bbox[1].min(y);
                bbox[2] = bbox[2].max(x);
                bbox[3] = bbox[3].max(y);

                for (nx, ny) in neighbors8(x, y, w, h) {
                    let n = ny * w + nx;
                    if !visited[n] && mask.data[n] {
                        visited[n] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            out.push(ComponentStats {
                pixels: count,
                centroid: Point2::new(
                    (sx / count as f64 + 0.5) as f32,
                    (sy / count as f64 + 0.5) as f32,
                ),
                bbox,
            });
        }
    }

    out
}

fn neighbors8(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    const OFFSETS: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];
    OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        (nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64).then_some((nx as usize, ny as usize))
    })
}

impl DetectionBackend for ComponentBackend {
    fn name(&self) -> &'static str {
        "components"
    }

    fn extract(&self, mask: &BinaryMask) -> Vec<Point2<f32>> {
        label_components(mask)
            .into_iter()
            .filter(|c| c.pixels >= self.min_pixels)
            .map(|c| c.centroid)
            .collect()
    }
}
