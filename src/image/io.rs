//! Convenience helpers for decoding rasters via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::RasterImage;
use crate::util::{ImageRole, SlideMatchError, SlideMatchResult};
use std::path::Path;

/// Converts a decoded dynamic image, keeping alpha only when the source has it.
pub fn raster_from_dynamic_image(img: &image::DynamicImage) -> SlideMatchResult<RasterImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    if img.color().has_alpha() {
        RasterImage::new(img.to_rgba8().into_raw(), width, height, 4)
    } else {
        RasterImage::new(img.to_rgb8().into_raw(), width, height, 3)
    }
}

/// Decodes PNG/JPEG/GIF bytes into a raster.
pub fn decode_raster(bytes: &[u8], role: ImageRole) -> SlideMatchResult<RasterImage> {
    let img = image::load_from_memory(bytes).map_err(|err| SlideMatchError::Decode {
        role,
        reason: err.to_string(),
    })?;
    raster_from_dynamic_image(&img)
}

/// Reads and decodes an image file.
pub fn load_raster<P: AsRef<Path>>(path: P, role: ImageRole) -> SlideMatchResult<RasterImage> {
    let bytes = std::fs::read(path.as_ref()).map_err(|err| SlideMatchError::ImageIo {
        reason: format!("{}: {err}", path.as_ref().display()),
    })?;
    decode_raster(&bytes, role)
}

#[cfg(test)]
mod tests {
    use super::{decode_raster, raster_from_dynamic_image};
    use crate::util::{ImageRole, SlideMatchError};

    #[test]
    fn garbage_bytes_report_decode_error() {
        let err = decode_raster(b"not an image", ImageRole::Background)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SlideMatchError::Decode {
                role: ImageRole::Background,
                ..
            }
        ));
    }

    #[test]
    fn rgba_sources_keep_alpha() {
        let rgba = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 0]));
        let raster = raster_from_dynamic_image(&image::DynamicImage::ImageRgba8(rgba)).unwrap();
        assert!(raster.has_alpha());
        assert_eq!(raster.pixel(2, 1), Some([1, 2, 3, 0]));

        let rgb = image::RgbImage::from_pixel(3, 2, image::Rgb([4, 5, 6]));
        let raster = raster_from_dynamic_image(&image::DynamicImage::ImageRgb8(rgb)).unwrap();
        assert!(!raster.has_alpha());
        assert_eq!(raster.pixel(0, 0), Some([4, 5, 6, 255]));
    }
}
