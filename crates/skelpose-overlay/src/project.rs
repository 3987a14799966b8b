use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Orthographic camera direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Looking along world Y: image x = world X, image up = world Z.
    Front,
    /// Looking along world X: image x = world Y, image up = world Z.
    Side,
}

impl View {
    pub const ALL: [View; 2] = [View::Front, View::Side];

    pub fn file_stem(self) -> &'static str {
        match self {
            View::Front => "front",
            View::Side => "side",
        }
    }

    #[inline]
    fn horizontal(self, p: &Vector3<f64>) -> f64 {
        match self {
            View::Front => p.x,
            View::Side => p.y,
        }
    }
}

/// Maps world points into a square image of `resolution` pixels.
///
/// The box around the framed points is centred and scaled uniformly, so the
/// front and side images of one rig share a scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    pub center: Point3<f64>,
    /// Pixels per world unit.
    pub px_per_unit: f64,
    pub resolution: u32,
}

impl Framing {
    /// Frame `points` with `margin` (1.0 = tight) around their largest extent.
    pub fn fit<I>(points: I, margin: f64, resolution: u32) -> Self
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        let mut any = false;
        for p in points {
            lo = lo.inf(&p.coords);
            hi = hi.sup(&p.coords);
            any = true;
        }
        if !any {
            return Self {
                center: Point3::origin(),
                px_per_unit: resolution as f64,
                resolution,
            };
        }

        let extent = (hi - lo).max() * margin.max(f64::EPSILON);
        let extent = if extent > f64::EPSILON { extent } else { 1.0 };
        Self {
            center: Point3::from(0.5 * (lo + hi)),
            px_per_unit: resolution as f64 / extent,
            resolution,
        }
    }

    /// Pixel position of `p` (pixel-centre convention, y down).
    pub fn project(&self, view: View, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.center;
        let half = 0.5 * self.resolution as f64;
        Point2::new(
            half + view.horizontal(&d) * self.px_per_unit,
            half - d.z * self.px_per_unit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_pick_their_horizontal_axis() {
        let framing = Framing::fit(
            [Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)],
            1.0,
            100,
        );
        let p = Point3::new(1.0, -1.0, 1.0);
        let front = framing.project(View::Front, &p);
        let side = framing.project(View::Side, &p);
        assert_eq!(front, Point2::new(100.0, 0.0));
        assert_eq!(side, Point2::new(0.0, 0.0));
    }

    #[test]
    fn margin_shrinks_the_framed_box() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 2.0)];
        let tight = Framing::fit(pts, 1.0, 120);
        let loose = Framing::fit(pts, 1.2, 120);
        assert!((tight.px_per_unit - 60.0).abs() < 1e-12);
        assert!((loose.px_per_unit - 50.0).abs() < 1e-12);
    }

    #[test]
    fn single_point_is_centred() {
        let framing = Framing::fit([Point3::new(3.0, 4.0, 5.0)], 1.2, 64);
        let px = framing.project(View::Front, &Point3::new(3.0, 4.0, 5.0));
        assert_eq!(px, Point2::new(32.0, 32.0));
    }
}
