use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point whose axes are scaled into [`NormalizationBounds`].
///
/// `x` and `z` come from the front view, `y` from the side view.
pub type NormalizedPoint3 = Point3<f64>;

/// Ordered 2D points detected in one image, in pixel coordinates.
///
/// The order is the discovery order of the detector and is used downstream as
/// the correspondence key, so it is deterministic for a given image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Width of the source image in pixels.
    pub width: usize,
    /// Height of the source image in pixels.
    pub height: usize,
    pub points: Vec<Point2<f32>>,
}

impl Detection {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            points: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Target range of the linear pixel-to-scene mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for NormalizationBounds {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
        }
    }
}

impl NormalizationBounds {
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    /// Map `value` linearly from `[0, extent]` to `[min, max]`.
    ///
    /// A zero extent maps everything to the centre of the range.
    #[inline]
    pub fn normalize(&self, value: f64, extent: usize) -> f64 {
        if extent == 0 {
            return self.center();
        }
        self.min + (value / extent as f64) * self.span()
    }

    /// Like [`normalize`](Self::normalize) but with the axis flipped, so the
    /// top image row maps to `max` ("up" is positive).
    #[inline]
    pub fn normalize_inverted(&self, value: f64, extent: usize) -> f64 {
        if extent == 0 {
            return self.center();
        }
        self.normalize(extent as f64 - value, extent)
    }

    /// Inverse of [`normalize`](Self::normalize).
    #[inline]
    pub fn denormalize(&self, value: f64, extent: usize) -> f64 {
        if self.span() == 0.0 {
            return 0.0;
        }
        (value - self.min) / self.span() * extent as f64
    }
}

/// Head and tail of one joint in one configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointPositionPair {
    pub head: NormalizedPoint3,
    pub tail: NormalizedPoint3,
}

impl JointPositionPair {
    pub fn new(head: NormalizedPoint3, tail: NormalizedPoint3) -> Self {
        Self { head, tail }
    }

    /// Bone direction `tail - head` (not normalized).
    #[inline]
    pub fn vector(&self) -> Vector3<f64> {
        self.tail - self.head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_maps_extent_to_bounds() {
        let b = NormalizationBounds::default();
        assert_relative_eq!(b.normalize(0.0, 200), -1.0);
        assert_relative_eq!(b.normalize(100.0, 200), 0.0);
        assert_relative_eq!(b.normalize(200.0, 200), 1.0);
    }

    #[test]
    fn inverted_axis_puts_top_row_up() {
        let b = NormalizationBounds::default();
        assert_relative_eq!(b.normalize_inverted(0.0, 100), 1.0);
        assert_relative_eq!(b.normalize_inverted(100.0, 100), -1.0);
        assert_relative_eq!(b.normalize_inverted(25.0, 100), 0.5);
    }

    #[test]
    fn custom_bounds_round_trip_through_denormalize() {
        let b = NormalizationBounds { min: 0.0, max: 4.0 };
        let n = b.normalize(30.0, 120);
        assert_relative_eq!(n, 1.0);
        assert_relative_eq!(b.denormalize(n, 120), 30.0);
    }

    #[test]
    fn zero_extent_maps_to_center() {
        let b = NormalizationBounds { min: 2.0, max: 6.0 };
        assert_relative_eq!(b.normalize(5.0, 0), 4.0);
    }
}
