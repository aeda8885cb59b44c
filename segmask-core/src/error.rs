// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SegmaskError {
    InvalidLabelFile(String),
    UnknownClass(String),
    DegeneratePolygon(String),
    UnsupportedShape(String),
    ClassIdOverflow(i32),
    SourceImageUnavailable(String),
    AnnotationReadError(String),
    VerificationError(String),
    BufferSizeError,
    ImageReadError,
    ImageWriteError,
    ImageExtensionError,
    ImageFormatError,
    NoFileError(String),
    DirError(String),
}

impl fmt::Display for SegmaskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SegmaskError::InvalidLabelFile(message) => {
                write!(
                    f,
                    "[segmask::InvalidLabelFile] The label list is malformed. {}",
                    message
                )
            }
            SegmaskError::UnknownClass(message) => {
                write!(
                    f,
                    "[segmask::UnknownClass] The class is not registered as an extractable label. {}",
                    message
                )
            }
            SegmaskError::DegeneratePolygon(message) => {
                write!(
                    f,
                    "[segmask::DegeneratePolygon] The shape cannot be rasterized. {}",
                    message
                )
            }
            SegmaskError::UnsupportedShape(shape_type) => {
                write!(
                    f,
                    "[segmask::UnsupportedShape] Shape type '{}' is not supported. Only polygon, rectangle and circle shapes can be rasterized.",
                    shape_type
                )
            }
            SegmaskError::ClassIdOverflow(id) => {
                write!(
                    f,
                    "[segmask::ClassIdOverflow] Class id {} does not fit in an 8-bit palette image (maximum class id is 254).",
                    id
                )
            }
            SegmaskError::SourceImageUnavailable(message) => {
                write!(
                    f,
                    "[segmask::SourceImageUnavailable] Source image could not be read. {}",
                    message
                )
            }
            SegmaskError::AnnotationReadError(message) => {
                write!(
                    f,
                    "[segmask::AnnotationReadError] Annotation could not be read. {}",
                    message
                )
            }
            SegmaskError::VerificationError(message) => {
                write!(
                    f,
                    "[segmask::VerificationError] Recombined masks do not match the class-index raster. {}",
                    message
                )
            }
            SegmaskError::BufferSizeError => {
                write!(
                    f,
                    "[segmask::BufferSizeError] The buffer does not match provided size."
                )
            }
            SegmaskError::ImageReadError => {
                write!(f, "[segmask::ImageReadError] Failed to read image.")
            }
            SegmaskError::ImageWriteError => {
                write!(f, "[segmask::ImageWriteError] Failed to write image.")
            }
            SegmaskError::ImageExtensionError => {
                write!(
                    f,
                    "[segmask::ImageExtensionError] Could not detect a valid image extension for input."
                )
            }
            SegmaskError::ImageFormatError => {
                write!(
                    f,
                    "[segmask::ImageFormatError] Only 8-bit palette or grayscale class-index images are supported."
                )
            }
            SegmaskError::NoFileError(message) => {
                write!(
                    f,
                    "[segmask::NoFileError] File could not be found. {}.",
                    message
                )
            }
            SegmaskError::DirError(message) => {
                write!(
                    f,
                    "[segmask::DirError] Directory could not be read. {}.",
                    message
                )
            }
        }
    }
}

impl std::error::Error for SegmaskError {}
