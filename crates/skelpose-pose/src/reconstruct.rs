//! Dual-view reconstruction.
//!
//! Front view: image x -> scene x, image y (inverted) -> scene z.
//! Side view: image x -> scene y, image y (inverted) -> scene z.
//! The two z estimates are averaged. Points pair up by index, so both
//! detections must come from the same discovery order.

use log::warn;
use serde::{Deserialize, Serialize};
use skelpose_core::{Detection, NormalizationBounds, NormalizedPoint3};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructParams {
    pub bounds: NormalizationBounds,
}

/// Output of one reconstruction (one configuration).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    pub points: Vec<NormalizedPoint3>,
    pub front_count: usize,
    pub side_count: usize,
}

impl Reconstruction {
    /// True when the two views disagreed on the point count and the longer
    /// one was cut to the shorter length.
    pub fn truncated(&self) -> bool {
        self.front_count != self.side_count
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Combine matched front/side detections into normalized 3D points.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(front, side, params), fields(front = front.len(), side = side.len()))
)]
pub fn reconstruct(
    front: &Detection,
    side: &Detection,
    params: &ReconstructParams,
) -> Reconstruction {
    let usable = front.len().min(side.len());
    if front.len() != side.len() {
        warn!(
            "front/side detection counts differ ({} vs {}), using {} points",
            front.len(),
            side.len(),
            usable
        );
    }

    let b = &params.bounds;
    let points = front
        .points
        .iter()
        .zip(&side.points)
        .map(|(f, s)| {
            let x = b.normalize(f.x as f64, front.width);
            let y = b.normalize(s.x as f64, side.width);
            let z_front = b.normalize_inverted(f.y as f64, front.height);
            let z_side = b.normalize_inverted(s.y as f64, side.height);
            NormalizedPoint3::new(x, y, 0.5 * (z_front + z_side))
        })
        .collect();

    Reconstruction {
        points,
        front_count: front.len(),
        side_count: side.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn det(width: usize, height: usize, pts: &[(f32, f32)]) -> Detection {
        Detection {
            width,
            height,
            points: pts.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        }
    }

    #[test]
    fn axes_follow_view_conventions() {
        let front = det(200, 100, &[(150.0, 25.0)]);
        let side = det(400, 100, &[(100.0, 25.0)]);
        let rec = reconstruct(&front, &side, &ReconstructParams::default());
        assert_eq!(rec.len(), 1);
        let p = rec.points[0];
        assert_relative_eq!(p.x, 0.5);
        assert_relative_eq!(p.y, -0.5);
        assert_relative_eq!(p.z, 0.5);
        assert!(!rec.truncated());
    }

    #[test]
    fn z_is_averaged_between_views() {
        let front = det(100, 100, &[(50.0, 0.0)]);
        let side = det(100, 100, &[(50.0, 50.0)]);
        let rec = reconstruct(&front, &side, &ReconstructParams::default());
        assert_relative_eq!(rec.points[0].z, 0.5);
    }

    #[test]
    fn mismatched_counts_truncate_to_shorter() {
        let front = det(100, 100, &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
        let side = det(100, 100, &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let rec = reconstruct(&front, &side, &ReconstructParams::default());
        assert_eq!(rec.len(), 3);
        assert!(rec.truncated());
        assert_eq!((rec.front_count, rec.side_count), (4, 3));
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let front = det(64, 64, &[(3.5, 9.0), (40.0, 12.5), (17.0, 60.0)]);
        let side = det(64, 64, &[(8.0, 9.5), (22.0, 13.0), (30.5, 59.0)]);
        let params = ReconstructParams::default();
        let a = reconstruct(&front, &side, &params);
        let b = reconstruct(&front, &side, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn custom_bounds_are_respected() {
        let params = ReconstructParams {
            bounds: NormalizationBounds { min: 0.0, max: 1.0 },
        };
        let front = det(10, 10, &[(10.0, 10.0)]);
        let side = det(10, 10, &[(0.0, 10.0)]);
        let p = reconstruct(&front, &side, &params).points[0];
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn empty_detections_reconstruct_to_nothing() {
        let rec = reconstruct(
            &Detection::empty(32, 32),
            &Detection::empty(32, 32),
            &ReconstructParams::default(),
        );
        assert!(rec.is_empty());
        assert!(!rec.truncated());
    }
}
