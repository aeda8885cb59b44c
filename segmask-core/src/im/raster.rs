// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::error::SegmaskError;

/// A row-major single-channel grid of pixels.
///
/// The struct is generic over the pixel type `T`. Class-index rasters store
/// `i32` class ids and binary masks store `u8` values. The length of the
/// buffer must be equal to the product of `w` * `h`.
///
/// # Examples
///
/// ```
/// use segmask_core::im::Raster;
///
/// let width = 10;
/// let height = 10;
/// let data = vec![0i32; (width * height) as usize];
///
/// let raster = Raster::new(width, height, data);
///
/// assert_eq!(raster.unwrap().len(), (width * height) as usize);
/// ```
///
/// ```
/// use segmask_core::im::Raster;
///
/// let data = vec![0u8; 7];
/// let raster = Raster::new(2, 3, data);
///
/// assert!(raster.is_err()); // Buffer size does not match dimensions
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    w: u32,              // Width
    h: u32,              // Height
    pub buffer: Vec<T>, // Row-major pixels
}

impl<T: Copy> Raster<T> {
    /// Initializes a raster from a row-major buffer
    ///
    /// # Arguments
    ///
    /// * `width` - Raster width
    /// * `height` - Raster height
    /// * `buffer` - Row-major pixels of length `width * height`
    pub fn new(width: u32, height: u32, buffer: Vec<T>) -> Result<Raster<T>, SegmaskError> {
        if (width as usize) * (height as usize) == buffer.len() {
            Ok(Raster {
                w: width,
                h: height,
                buffer,
            })
        } else {
            Err(SegmaskError::BufferSizeError)
        }
    }

    /// Initializes a raster with every pixel set to `value`
    pub fn filled(width: u32, height: u32, value: T) -> Raster<T> {
        Raster {
            w: width,
            h: height,
            buffer: vec![value; (width as usize) * (height as usize)],
        }
    }
}

// >>> PROPERTY METHODS

impl<T: Copy> Raster<T> {
    /// Width of the raster
    pub fn width(&self) -> u32 {
        self.w
    }

    /// Height of the raster
    pub fn height(&self) -> u32 {
        self.h
    }

    /// Shape of the raster in (height, width) order
    pub fn shape(&self) -> (u32, u32) {
        (self.h, self.w)
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if raster has no pixels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// <<< PROPERTY METHODS

// >>> ACCESS METHODS

impl<T: Copy> Raster<T> {
    /// Returns the raw row-major buffer
    pub fn into_raw(self) -> Vec<T> {
        self.buffer
    }

    /// Returns a reference to the raw row-major buffer
    pub fn as_raw(&self) -> &[T] {
        &self.buffer
    }

    // An iterator over the raw buffer
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// A mutable slice over row `y`
    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        let w = self.w as usize;
        let start = (y as usize) * w;
        &mut self.buffer[start..start + w]
    }

    /// Apply `f` to every pixel and return a raster of the same shape
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> Raster<U> {
        Raster {
            w: self.w,
            h: self.h,
            buffer: self.buffer.iter().map(|&p| f(p)).collect(),
        }
    }
}

// <<< ACCESS METHODS
