use log::debug;
use skelpose_core::{ColorChannel, Detection, RgbImageView};

use crate::backend::{select_backend, DetectionBackend};
use crate::mask::BinaryMask;
use crate::threshold::resolve_threshold;
use crate::{DetectParams, ThresholdMode};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Finds highlight-coloured skeleton segments in RGB renders.
///
/// The backend is chosen once, when the detector is built.
pub struct BoneDetector {
    params: DetectParams,
    backend: Box<dyn DetectionBackend>,
}

impl BoneDetector {
    pub fn new(params: DetectParams) -> Self {
        let backend = select_backend(&params);
        Self { params, backend }
    }

    /// Use a caller-provided backend instead of the one `params` selects.
    pub fn with_backend(mut self, backend: Box<dyn DetectionBackend>) -> Self {
        self.backend = backend;
        self
    }

    #[inline]
    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    #[inline]
    pub fn backend(&self) -> &dyn DetectionBackend {
        self.backend.as_ref()
    }

    /// Foreground mask for `img` under the configured channel and threshold.
    pub fn mask(&self, img: &RgbImageView<'_>) -> BinaryMask {
        let threshold = resolve_threshold(img, self.params.channel, self.params.threshold);
        BinaryMask::from_channel(img, self.params.channel, threshold)
    }

    /// Detect segment points in one image.
    ///
    /// An image with no pixel above the threshold yields an empty
    /// [`Detection`]; that is a valid result, not an error.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, img), fields(width = img.width, height = img.height, backend = self.backend.name()))
    )]
    pub fn detect(&self, img: &RgbImageView<'_>) -> Detection {
        if img.is_empty() {
            return Detection::empty(img.width, img.height);
        }
        let mask = self.mask(img);
        let points = if mask.is_empty() {
            Vec::new()
        } else {
            self.backend.extract(&mask)
        };
        debug!(
            "{}x{} image: {} foreground px, {} points via {}",
            img.width,
            img.height,
            mask.count(),
            points.len(),
            self.backend.name()
        );
        Detection {
            width: img.width,
            height: img.height,
            points,
        }
    }
}

/// One-shot detection with a fixed threshold and the default backend.
pub fn detect(img: &RgbImageView<'_>, channel: ColorChannel, threshold: u8) -> Detection {
    let params = DetectParams {
        channel,
        threshold: ThresholdMode::Fixed(threshold),
        ..DetectParams::default()
    };
    BoneDetector::new(params).detect(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendChoice;
    use skelpose_core::RgbImage;

    fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, w: i64, h: i64, rgb: [u8; 3]) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, rgb);
            }
        }
    }

    #[test]
    fn dark_image_gives_empty_detection() {
        let mut img = RgbImage::new(32, 32);
        img.fill([90, 200, 200]);
        let det = detect(&img.view(), ColorChannel::R, 100);
        assert!(det.is_empty());
        assert_eq!((det.width, det.height), (32, 32));
    }

    #[test]
    fn zero_sized_image_gives_empty_detection() {
        let img = RgbImage::new(0, 0);
        assert!(detect(&img.view(), ColorChannel::R, 100).is_empty());
    }

    #[test]
    fn red_blobs_are_found_in_scan_order() {
        let mut img = RgbImage::new(40, 40);
        fill_rect(&mut img, 30, 2, 4, 4, [255, 0, 0]);
        fill_rect(&mut img, 2, 20, 4, 4, [255, 0, 0]);
        // Green blob is ignored on the red channel.
        fill_rect(&mut img, 10, 10, 4, 4, [0, 255, 0]);

        let det = detect(&img.view(), ColorChannel::R, 100);
        assert_eq!(det.len(), 2);
        assert!(det.points[0].y < det.points[1].y);
        assert!((det.points[0].x - 32.0).abs() < 1e-4);
    }

    #[test]
    fn detection_is_deterministic() {
        let mut img = RgbImage::new(64, 48);
        for k in 0..6 {
            fill_rect(&mut img, 5 + 9 * k, 3 + 7 * k, 3, 3, [200, 0, 0]);
        }
        let detector = BoneDetector::new(DetectParams::default());
        let a = detector.detect(&img.view());
        let b = detector.detect(&img.view());
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn otsu_mode_separates_dim_highlight() {
        let mut img = RgbImage::new(20, 20);
        img.fill([20, 20, 20]);
        fill_rect(&mut img, 4, 4, 3, 3, [70, 0, 0]);
        let params = DetectParams {
            threshold: ThresholdMode::Otsu,
            ..DetectParams::default()
        };
        // Fixed(100) would miss the dim blob.
        assert!(detect(&img.view(), ColorChannel::R, 100).is_empty());
        let det = BoneDetector::new(params).detect(&img.view());
        assert_eq!(det.len(), 1);
    }

    #[test]
    fn subsample_backend_reports_more_points_for_long_segments() {
        let mut img = RgbImage::new(60, 10);
        fill_rect(&mut img, 0, 4, 60, 2, [255, 0, 0]);
        let params = DetectParams {
            backend: BackendChoice::Subsample,
            grid_cell_px: 10,
            ..DetectParams::default()
        };
        let det = BoneDetector::new(params).detect(&img.view());
        assert_eq!(det.len(), 6);
    }
}
