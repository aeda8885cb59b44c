// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use image::{GrayImage, Rgb, RgbImage};

use crate::constant::{IGNORE_ID, PALETTE_SIZE, VISUALIZATION_ALPHA};
use crate::error::SegmaskError;
use crate::im::ClassIndexRaster;

/// The PASCAL VOC colormap
///
/// Colors are derived from the bits of the index so every index maps to the
/// same color on every run. Index 0 (background) is black.
///
/// # Arguments
///
/// * `n` - Number of colors to generate
///
/// # Examples
///
/// ```
/// use segmask_core::cv::label_colormap;
///
/// let colormap = label_colormap(4);
/// assert_eq!(colormap, vec![[0, 0, 0], [128, 0, 0], [0, 128, 0], [128, 128, 0]]);
/// ```
pub fn label_colormap(n: usize) -> Vec<[u8; 3]> {
    (0..n)
        .map(|i| {
            let mut id = i;
            let mut color = [0u8; 3];
            for shift in (0..8).rev() {
                color[0] |= ((id & 1) as u8) << shift;
                color[1] |= (((id >> 1) & 1) as u8) << shift;
                color[2] |= (((id >> 2) & 1) as u8) << shift;
                id >>= 3;
            }
            color
        })
        .collect()
}

/// Color of a class id, black for the ignore class
pub fn class_color(colormap: &[[u8; 3]], id: i32) -> [u8; 3] {
    if id == IGNORE_ID {
        return [0, 0, 0];
    }

    usize::try_from(id)
        .ok()
        .and_then(|idx| colormap.get(idx % PALETTE_SIZE))
        .copied()
        .unwrap_or([0, 0, 0])
}

/// Blend class colors over a grayscale copy of the source image
///
/// Each output pixel is `alpha * color + (1 - alpha) * gray` with the
/// ignore class drawn in black.
///
/// # Arguments
///
/// * `raster` - Class-index raster
/// * `image` - Grayscale source image with the same dimensions
/// * `colormap` - Colors indexed by class id
pub fn visualize(
    raster: &ClassIndexRaster,
    image: &GrayImage,
    colormap: &[[u8; 3]],
) -> Result<RgbImage, SegmaskError> {
    if image.dimensions() != (raster.width(), raster.height()) {
        return Err(SegmaskError::BufferSizeError);
    }

    let mut visualization = RgbImage::new(raster.width(), raster.height());

    for ((pixel, &id), gray) in visualization
        .pixels_mut()
        .zip(raster.iter())
        .zip(image.pixels())
    {
        *pixel = if id == IGNORE_ID {
            Rgb([0, 0, 0])
        } else {
            let gray = gray.0[0] as f32;
            let color = class_color(colormap, id);
            Rgb(color.map(|c| {
                (VISUALIZATION_ALPHA * c as f32 + (1.0 - VISUALIZATION_ALPHA) * gray).round() as u8
            }))
        };
    }

    Ok(visualization)
}
