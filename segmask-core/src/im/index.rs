// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use crate::constant::{IGNORE_ID, MAX_PALETTE_ID, PALETTE_IGNORE_INDEX, PALETTE_SIZE};
use crate::cv::label_colormap;
use crate::error::SegmaskError;
use crate::im::Raster;
use crate::io::{read_indexed_png, read_numpy_i32, write_indexed_png, write_numpy};

/// A row-major grid of class ids, one per pixel
///
/// # Examples
///
/// ```
/// use segmask_core::im::ClassIndexRaster;
///
/// let raster = ClassIndexRaster::new(2, 2, vec![1, 0, 0, 0]).unwrap();
/// assert_eq!(raster.count(1), 1);
/// ```
pub type ClassIndexRaster = Raster<i32>;

// >>> I/O METHODS

impl ClassIndexRaster {
    /// Open a class-index raster from a png or npy file
    ///
    /// Png files must be 8-bit palette or grayscale images and their raw
    /// values are read as class ids with 255 mapped back to the ignore id.
    ///
    /// ```no_run
    /// use segmask_core::im::ClassIndexRaster;
    /// let raster = ClassIndexRaster::open("SegmentationClassPNG/sample_001.png");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ClassIndexRaster, SegmaskError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("png") => {
                let (w, h, values) = read_indexed_png(path)?;
                ClassIndexRaster::new(
                    w,
                    h,
                    values
                        .into_iter()
                        .map(|v| {
                            if v == PALETTE_IGNORE_INDEX {
                                IGNORE_ID
                            } else {
                                v as i32
                            }
                        })
                        .collect(),
                )
            }
            Some("npy") => {
                let (w, h, values) = read_numpy_i32(path)?;
                ClassIndexRaster::new(w, h, values)
            }
            _ => Err(SegmaskError::ImageExtensionError),
        }
    }

    /// Save as an 8-bit palette png whose pixel values are the class ids
    ///
    /// The palette carries the class colormap so the image also displays
    /// in color. The ignore id is stored as index 255.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), SegmaskError> {
        let indices = self.to_palette_indices()?;
        let palette = label_colormap(PALETTE_SIZE);
        write_indexed_png(path, self.width(), self.height(), &indices, &palette)
    }

    /// Save as a (height, width) `i32` numpy array
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), SegmaskError> {
        write_numpy(
            path,
            self.as_raw(),
            &[self.height() as u64, self.width() as u64],
        )
    }
}

// <<< I/O METHODS

// >>> CONVERSION METHODS

impl ClassIndexRaster {
    /// Class ids as 8-bit palette indices
    pub fn to_palette_indices(&self) -> Result<Vec<u8>, SegmaskError> {
        self.iter()
            .map(|&id| match id {
                IGNORE_ID => Ok(PALETTE_IGNORE_INDEX),
                0..=MAX_PALETTE_ID => Ok(id as u8),
                _ => Err(SegmaskError::ClassIdOverflow(id)),
            })
            .collect()
    }

    /// Number of pixels equal to `id`
    pub fn count(&self, id: i32) -> usize {
        self.iter().filter(|&&p| p == id).count()
    }
}

// <<< CONVERSION METHODS
