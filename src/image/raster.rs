//! Decoded RGB/RGBA rasters and the normalization applied before matching.

use crate::image::{required_len, GrayImage};
use crate::util::{SlideMatchError, SlideMatchResult};

/// Decoded raster with 3 (RGB) or 4 (RGBA) interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl RasterImage {
    /// Wraps an interleaved, row-major buffer of `width * height * channels`
    /// bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize, channels: usize) -> SlideMatchResult<Self> {
        if channels != 3 && channels != 4 {
            return Err(SlideMatchError::UnsupportedChannels { channels });
        }
        let pixels = required_len(width, height, width)?;
        let needed = pixels
            .checked_mul(channels)
            .ok_or(SlideMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(SlideMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(SlideMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Creates an RGB raster filled with one color.
    pub fn filled_rgb(width: usize, height: usize, rgb: [u8; 3]) -> SlideMatchResult<Self> {
        let pixels = required_len(width, height, width)?;
        Self::new(rgb.repeat(pixels), width, height, 3)
    }

    /// Creates an RGBA raster filled with one color.
    pub fn filled_rgba(width: usize, height: usize, rgba: [u8; 4]) -> SlideMatchResult<Self> {
        let pixels = required_len(width, height, width)?;
        Self::new(rgba.repeat(pixels), width, height, 4)
    }

    /// Builds a raster from a per-pixel function, mostly for fixtures.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> SlideMatchResult<Self>
    where
        F: FnMut(usize, usize) -> [u8; 4],
    {
        let pixels = required_len(width, height, width)?;
        let mut data = Vec::with_capacity(pixels * channels);
        for y in 0..height {
            for x in 0..width {
                let px = f(x, y);
                data.extend_from_slice(&px[..channels.min(4)]);
            }
        }
        Self::new(data, width, height, channels)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels (3 or 4).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns true when the raster carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Returns the interleaved pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns `[r, g, b, a]` at `(x, y)`; alpha is 255 for RGB rasters.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        let px = self.data.get(start..start + self.channels)?;
        let alpha = if self.channels == 4 { px[3] } else { u8::MAX };
        Some([px[0], px[1], px[2], alpha])
    }

    fn alpha_at(&self, x: usize, y: usize) -> u8 {
        if self.channels == 4 {
            self.data[(y * self.width + x) * 4 + 3]
        } else {
            u8::MAX
        }
    }

    fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Self {
        let row_bytes = width * self.channels;
        let mut data = Vec::with_capacity(row_bytes * height);
        for y in y0..y0 + height {
            let start = (y * self.width + x0) * self.channels;
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Self {
            data,
            width,
            height,
            channels: self.channels,
        }
    }
}

/// Result of trimming a raster to its opaque bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueCrop {
    /// The cropped raster, or the untouched input when nothing is opaque.
    pub image: RasterImage,
    /// Row of the crop origin in the source image.
    pub row_offset: usize,
    /// Column of the crop origin in the source image.
    pub col_offset: usize,
    fully_transparent: bool,
}

impl OpaqueCrop {
    /// True when the source had no opaque pixel; the offsets then hold the
    /// `(height, width)` sentinel and no crop was applied.
    pub fn is_fully_transparent(&self) -> bool {
        self.fully_transparent
    }
}

/// Converts a raster to BT.601 integer luma: `(299R + 587G + 114B) / 1000`.
pub fn to_grayscale(img: &RasterImage) -> GrayImage {
    let data = img
        .data
        .chunks_exact(img.channels)
        .map(|px| {
            let luma = 299 * u32::from(px[0]) + 587 * u32::from(px[1]) + 114 * u32::from(px[2]);
            (luma / 1000) as u8
        })
        .collect();
    GrayImage::from_parts(data, img.width, img.height)
}

/// Crops a raster to the minimal rectangle holding every pixel with
/// non-zero alpha.
///
/// Rasters without an alpha channel are fully opaque and come back whole with
/// a zero offset. A fully transparent raster comes back unmodified with the
/// offset set to `(height, width)`.
pub fn crop_to_opaque_bounds(img: &RasterImage) -> OpaqueCrop {
    let (width, height) = (img.width, img.height);
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0usize;
    let mut max_y = 0usize;

    for y in 0..height {
        for x in 0..width {
            if img.alpha_at(x, y) != 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if min_x > max_x || min_y > max_y {
        return OpaqueCrop {
            image: img.clone(),
            row_offset: min_y,
            col_offset: min_x,
            fully_transparent: true,
        };
    }

    OpaqueCrop {
        image: img.crop(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
        row_offset: min_y,
        col_offset: min_x,
        fully_transparent: false,
    }
}

/// Unsigned magnitude of the difference of two bytes.
#[inline]
pub fn abs_diff(a: u8, b: u8) -> u8 {
    a.abs_diff(b)
}
