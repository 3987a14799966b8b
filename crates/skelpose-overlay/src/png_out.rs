use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use skelpose_core::RgbImage;

use crate::OverlayError;

/// Write `img` as an 8-bit RGB PNG.
pub fn write_png(path: impl AsRef<Path>, img: &RgbImage) -> Result<(), OverlayError> {
    let width = u32::try_from(img.width).map_err(|_| OverlayError::TooLarge(img.width))?;
    let height = u32::try_from(img.height).map_err(|_| OverlayError::TooLarge(img.height))?;

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&img.data)?;
    writer.finish()?;
    Ok(())
}
