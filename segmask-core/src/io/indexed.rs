// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::error::SegmaskError;

/// Write an 8-bit palette-indexed png
///
/// The stored pixel values are the palette indices themselves, so a reader
/// that skips palette expansion recovers `indices` exactly.
///
/// # Arguments
///
/// * `path` - Path to output png file
/// * `width` - Image width
/// * `height` - Image height
/// * `indices` - Row-major palette indices
/// * `palette` - RGB palette entries (at most 256)
pub fn write_indexed_png<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    indices: &[u8],
    palette: &[[u8; 3]],
) -> Result<(), SegmaskError> {
    if (width as usize) * (height as usize) != indices.len() || palette.len() > 256 {
        return Err(SegmaskError::BufferSizeError);
    }

    let file = File::create(path).map_err(|_| SegmaskError::ImageWriteError)?;

    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Indexed);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_palette(palette.concat());

    let mut writer = encoder
        .write_header()
        .map_err(|_| SegmaskError::ImageWriteError)?;

    writer
        .write_image_data(indices)
        .map_err(|_| SegmaskError::ImageWriteError)?;

    writer.finish().map_err(|_| SegmaskError::ImageWriteError)
}

/// Read the raw 8-bit values of a palette-indexed or grayscale png
///
/// Palette images are returned as indices without palette expansion.
///
/// # Returns
///
/// The image width, height and row-major values
pub fn read_indexed_png<P: AsRef<Path>>(path: P) -> Result<(u32, u32, Vec<u8>), SegmaskError> {
    let file = File::open(path).map_err(|err| SegmaskError::NoFileError(err.to_string()))?;

    let mut decoder = Decoder::new(BufReader::new(file));
    decoder.set_transformations(Transformations::IDENTITY);

    let mut reader = decoder
        .read_info()
        .map_err(|_| SegmaskError::ImageReadError)?;

    let mut buffer = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buffer)
        .map_err(|_| SegmaskError::ImageReadError)?;

    match (info.color_type, info.bit_depth) {
        (ColorType::Indexed, BitDepth::Eight) | (ColorType::Grayscale, BitDepth::Eight) => {}
        _ => return Err(SegmaskError::ImageFormatError),
    }

    buffer.truncate(info.buffer_size());

    Ok((info.width, info.height, buffer))
}
