use nalgebra::{Point2, Vector2};
use skelpose_core::RgbImage;

/// Fill every pixel whose centre lies within `radius` of segment `a`-`b`.
pub fn draw_segment(img: &mut RgbImage, a: Point2<f64>, b: Point2<f64>, radius: f64, rgb: [u8; 3]) {
    let radius = radius.max(0.5);
    let x0 = (a.x.min(b.x) - radius).floor() as i64;
    let x1 = (a.x.max(b.x) + radius).ceil() as i64;
    let y0 = (a.y.min(b.y) - radius).floor() as i64;
    let y1 = (a.y.max(b.y) + radius).ceil() as i64;

    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(img.width as i64 - 1);
    let y1 = y1.min(img.height as i64 - 1);

    let r2 = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let c = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
            if distance_sq_to_segment(c, a, b) <= r2 {
                img.put_pixel(x, y, rgb);
            }
        }
    }
}

/// Shorten `a`-`b` by `fraction` of its length at each end.
pub fn inset_segment(a: Point2<f64>, b: Point2<f64>, fraction: f64) -> (Point2<f64>, Point2<f64>) {
    let f = fraction.clamp(0.0, 0.49);
    let d = b - a;
    (a + d * f, b - d * f)
}

fn distance_sq_to_segment(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    let ab: Vector2<f64> = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return (p - a).norm_squared();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_segment_covers_its_row() {
        let mut img = RgbImage::new(20, 9);
        draw_segment(&mut img, Point2::new(2.0, 4.5), Point2::new(18.0, 4.5), 1.0, [255, 0, 0]);
        assert_eq!(img.pixel(10, 4), [255, 0, 0]);
        assert_eq!(img.pixel(10, 0), [0, 0, 0]);
        assert_eq!(img.pixel(0, 4), [0, 0, 0]);
    }

    #[test]
    fn out_of_bounds_segment_is_clipped() {
        let mut img = RgbImage::new(8, 8);
        draw_segment(&mut img, Point2::new(-20.0, -20.0), Point2::new(40.0, 40.0), 2.0, [9, 9, 9]);
        assert_eq!(img.pixel(4, 4), [9, 9, 9]);
    }

    #[test]
    fn inset_trims_both_ends() {
        let (a, b) = inset_segment(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), 0.1);
        assert!((a.x - 1.0).abs() < 1e-12);
        assert!((b.x - 9.0).abs() < 1e-12);
    }
}
