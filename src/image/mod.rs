//! Raster buffers, grayscale views and the normalization steps that feed the
//! matchers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. `GrayImage` owns a
//! contiguous single-channel buffer; `RasterImage` owns decoded RGB/RGBA
//! pixels.

use crate::util::{SlideMatchError, SlideMatchResult};

#[cfg(feature = "image-io")]
pub mod io;
mod raster;

pub use raster::{abs_diff, crop_to_opaque_bounds, to_grayscale, OpaqueCrop, RasterImage};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> SlideMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> SlideMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(SlideMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> SlideMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(SlideMatchError::InvalidDimensions { width, height });
        }

        let out_of_bounds = SlideMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        Ok(ImageView {
            data: &self.data[start..],
            width,
            height,
            stride: self.stride,
        })
    }

    /// Iterates over all rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }
}

impl ImageView<'_, u8> {
    /// Reads `(x, y)` as `f64`, returning zero outside the image.
    #[inline]
    pub(crate) fn value_or_zero(&self, x: isize, y: isize) -> f64 {
        if x < 0 || y < 0 {
            return 0.0;
        }
        self.get(x as usize, y as usize)
            .map_or(0.0, |&value| f64::from(value))
    }
}

/// Owned contiguous grayscale image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl GrayImage {
    /// Wraps a contiguous buffer of exactly `width * height` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> SlideMatchResult<Self> {
        let needed = required_len(width, height, width)?;
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
        })
    }

    /// Creates an image filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> SlideMatchResult<Self> {
        let len = required_len(width, height, width)?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> Self {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self {
            data,
            width: view.width(),
            height: view.height(),
        }
    }

    /// Builds an image from already validated parts.
    pub(crate) fn from_parts(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel buffer in row-major order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Consumes the image and returns its buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn required_len(width: usize, height: usize, stride: usize) -> SlideMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(SlideMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(SlideMatchError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(SlideMatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::{GrayImage, ImageView};
    use crate::util::SlideMatchError;

    #[test]
    fn value_or_zero_pads_outside_the_view() {
        let data = [10u8, 20, 30, 40];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        assert_eq!(view.value_or_zero(1, 1), 40.0);
        assert_eq!(view.value_or_zero(-1, 0), 0.0);
        assert_eq!(view.value_or_zero(0, 2), 0.0);
    }

    #[test]
    fn from_view_compacts_strided_rows() {
        let data = [1u8, 2, 99, 3, 4, 99];
        let view = ImageView::new(&data, 2, 2, 3).unwrap();
        let owned = GrayImage::from_view(view);
        assert_eq!(owned.data(), &[1, 2, 3, 4]);
        assert_eq!(owned.view().stride(), 2);
    }

    #[test]
    fn roi_shares_the_parent_stride() {
        let data: Vec<u8> = (0..20).collect();
        let view = ImageView::from_slice(&data, 5, 4).unwrap();
        let roi = view.roi(1, 2, 3, 2).unwrap();
        assert_eq!(roi.stride(), 5);
        assert_eq!(roi.row(0).unwrap(), &[11, 12, 13]);
        assert_eq!(roi.row(1).unwrap(), &[16, 17, 18]);
        assert_eq!(roi.get(2, 1), Some(&18));
    }

    #[test]
    fn roi_rejects_windows_past_the_edge() {
        let data = [0u8; 12];
        let view = ImageView::from_slice(&data, 4, 3).unwrap();
        assert!(matches!(
            view.roi(2, 0, 3, 1),
            Err(SlideMatchError::RoiOutOfBounds { .. })
        ));
        assert!(matches!(
            view.roi(0, 0, 0, 1),
            Err(SlideMatchError::InvalidDimensions { .. })
        ));
    }
}
