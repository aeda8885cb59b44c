// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use npyz::{self, DType, NpyFile, TypeChar, WriterBuilder};

use crate::error::SegmaskError;

/// Write a numpy file from a slice of specified shape
///
/// # Arguments
///
/// * `path` - Path to output numpy file
/// * `data` - Slice of numeric type
/// * `shape` - Shape of the array (shape product must equal length of data)
///
/// # Examples
///
/// ```no_run
/// use segmask_core::io::write_numpy;
/// write_numpy("labels.npy", &[0i32, 1, 1, 0], &[2, 2]).unwrap();
/// ```
pub fn write_numpy<T, P: AsRef<Path>>(
    path: P,
    data: &[T],
    shape: &[u64],
) -> Result<(), SegmaskError>
where
    T: npyz::Serialize + npyz::AutoSerialize,
{
    if shape.iter().product::<u64>() != data.len() as u64 {
        return Err(SegmaskError::BufferSizeError);
    }

    let mut buffer = vec![];
    let mut writer = npyz::WriteOptions::<T>::new()
        .default_dtype()
        .shape(shape)
        .writer(&mut buffer)
        .begin_nd()
        .map_err(|_| SegmaskError::ImageWriteError)?;

    for d in data {
        writer.push(d).map_err(|_| SegmaskError::ImageWriteError)?;
    }

    writer.finish().map_err(|_| SegmaskError::ImageWriteError)?;
    std::fs::write(path, buffer).map_err(|_| SegmaskError::ImageWriteError)?;
    Ok(())
}

/// Read a two-dimensional integer numpy array as `i32` values
///
/// Arrays of `u8`, `i32` and `i64` are accepted. A `u8` value of 255 is
/// returned as -1 so 8-bit class-index arrays keep their ignore pixels.
///
/// # Returns
///
/// The array width, height and row-major values
pub fn read_numpy_i32<P: AsRef<Path>>(path: P) -> Result<(u32, u32, Vec<i32>), SegmaskError> {
    let bytes = std::fs::read(&path).map_err(|err| SegmaskError::NoFileError(err.to_string()))?;
    let npy = NpyFile::new(&bytes[..]).map_err(|_| SegmaskError::ImageReadError)?;

    let shape = npy.shape().to_vec();

    let (h, w) = match shape.as_slice() {
        [h, w] => (*h as u32, *w as u32),
        [h, w, 1] => (*h as u32, *w as u32),
        _ => return Err(SegmaskError::ImageFormatError),
    };

    let values: Vec<i32> = match npy.dtype() {
        DType::Plain(x) => match (x.type_char(), x.size_field()) {
            (TypeChar::Uint, 1) => npy
                .into_vec::<u8>()
                .map_err(|_| SegmaskError::ImageReadError)?
                .into_iter()
                .map(|v| if v == u8::MAX { -1 } else { v as i32 })
                .collect(),
            (TypeChar::Int, 4) => npy.into_vec::<i32>().map_err(|_| SegmaskError::ImageReadError)?,
            (TypeChar::Int, 8) => npy
                .into_vec::<i64>()
                .map_err(|_| SegmaskError::ImageReadError)?
                .into_iter()
                .map(|v| i32::try_from(v).map_err(|_| SegmaskError::ClassIdOverflow(i32::MAX)))
                .collect::<Result<Vec<i32>, _>>()?,
            _ => return Err(SegmaskError::ImageFormatError),
        },
        _ => return Err(SegmaskError::ImageFormatError),
    };

    Ok((w, h, values))
}
