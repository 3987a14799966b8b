use std::path::{Path, PathBuf};

use crate::core::{ImageError, RgbImage, RgbImageView};
use crate::pose::{PoseExtractor, PoseParams, PoseRig, PoseViews, ProcessingResult};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced while loading renders.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot open `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode `{}`: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error(transparent)]
    Buffer(#[from] ImageError),
}

/// Load any format the `image` crate decodes as 8-bit RGB.
///
/// Alpha is dropped, so a transparent render background reads as black.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, LoadError> {
    let path = path.as_ref();
    let reader = ::image::ImageReader::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(from_image(&decoded.to_rgb8()))
}

/// Copy an `image::RgbImage` into the workspace raster type.
pub fn from_image(img: &::image::RgbImage) -> RgbImage {
    RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Borrow an `image::RgbImage` as a raster view without copying.
pub fn rgb_view(img: &::image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Build an owned raster from a raw interleaved RGB buffer.
pub fn rgb_image_from_slice(width: u32, height: u32, pixels: &[u8]) -> Result<RgbImage, LoadError> {
    Ok(RgbImage::from_raw(
        width as usize,
        height as usize,
        pixels.to_vec(),
    )?)
}

/// Run the full pipeline on four render files, in front-rest, side-rest,
/// front-target, side-target order.
///
/// Every file is loaded before the rig is touched; one unreadable file fails
/// the call and leaves the rig unchanged.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn process_image_files<P, R>(
    paths: [P; 4],
    rig: &mut R,
    params: &PoseParams,
) -> Result<ProcessingResult, LoadError>
where
    P: AsRef<Path>,
    R: PoseRig + ?Sized,
{
    let [front_rest, side_rest, front_target, side_target] = paths;
    let front_rest = load_rgb(front_rest)?;
    let side_rest = load_rgb(side_rest)?;
    let front_target = load_rgb(front_target)?;
    let side_target = load_rgb(side_target)?;

    let views = PoseViews {
        front_rest: front_rest.view(),
        side_rest: side_rest.view(),
        front_target: front_target.view(),
        side_target: side_target.view(),
    };
    Ok(PoseExtractor::new(params.clone()).process(&views, rig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_buffer_length_is_checked() {
        assert!(rgb_image_from_slice(2, 2, &[0; 12]).is_ok());
        let err = rgb_image_from_slice(2, 2, &[0; 11]).expect_err("short buffer");
        assert!(matches!(err, LoadError::Buffer(ImageError::InvalidBuffer { .. })));
    }

    #[test]
    fn rgba_files_drop_alpha() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rgba.png");
        let mut img = ::image::RgbaImage::new(3, 2);
        img.put_pixel(1, 1, ::image::Rgba([255, 0, 0, 255]));
        img.save(&path).expect("save");

        let rgb = load_rgb(&path).expect("load");
        assert_eq!((rgb.width, rgb.height), (3, 2));
        assert_eq!(rgb.pixel(1, 1), [255, 0, 0]);
        assert_eq!(rgb.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_rgb("/definitely/not/here.png").expect_err("missing");
        assert!(err.to_string().contains("not/here.png"));
    }
}
