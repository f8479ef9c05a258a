//! Pixel sources
//!
//! The scanning engine only needs random access to 8-bit gray levels.
//! [`PixelSource`] captures that capability; [`GrayImage`] is a plain
//! owned buffer implementing it, used for rendering and tests.

use crate::error::{Error, Result};
use crate::geom::Rect;

/// Gray level of a white (background) pixel
pub const WHITE: u8 = 255;

/// Gray level of a black (foreground) pixel
pub const BLACK: u8 = 0;

/// Read access to an 8-bit gray image
///
/// `pixel` is only called with `0 <= x < width()` and
/// `0 <= y < height()`.
pub trait PixelSource: Sync {
    /// Image width in pixels
    fn width(&self) -> i32;

    /// Image height in pixels
    fn height(&self) -> i32;

    /// Gray level at (x, y), 0 being black
    fn pixel(&self, x: i32, y: i32) -> u8;
}

/// Owned 8-bit gray image, stored row by row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl GrayImage {
    /// Create a white image
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if a dimension is not positive.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![WHITE; width as usize * height as usize],
        })
    }

    /// Wrap an existing row-major buffer
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is not positive or if the buffer
    /// length does not match `width * height`.
    pub fn from_raw(width: i32, height: i32, data: Vec<u8>) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "buffer length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image width in pixels
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bounds of the whole image
    pub fn bounds(&self) -> Rect {
        Rect::new_unchecked(0, 0, self.width, self.height)
    }

    /// Row-major pixel data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image and return its pixel data
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Gray level at (x, y), or `None` outside the image
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[self.offset(x, y)])
    }

    /// Set the gray level at (x, y)
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] outside the image.
    pub fn set_pixel(&mut self, x: i32, y: i32, value: u8) -> Result<()> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: self.offset(x.max(0), y.max(0)),
                len: self.data.len(),
            });
        }
        let idx = self.offset(x, y);
        self.data[idx] = value;
        Ok(())
    }

    /// Fill a rectangle, clipped to the image, with a gray level
    pub fn fill_rect(&mut self, rect: &Rect, value: u8) {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let row = self.offset(clipped.x, y);
            self.data[row..row + clipped.w as usize].fill(value);
        }
    }

    /// Number of pixels darker than or equal to `max_foreground`
    pub fn count_foreground(&self, max_foreground: u8) -> usize {
        self.data.iter().filter(|&&v| v <= max_foreground).count()
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl PixelSource for GrayImage {
    fn width(&self) -> i32 {
        GrayImage::width(self)
    }

    fn height(&self) -> i32 {
        GrayImage::height(self)
    }

    #[inline]
    fn pixel(&self, x: i32, y: i32) -> u8 {
        self.data[self.offset(x, y)]
    }
}
