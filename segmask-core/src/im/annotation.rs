// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SegmaskError;

/// Geometry of a labeled shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Polygon,
    Rectangle,
    Circle,
}

/// A labeled shape drawn on a source image
///
/// Points are (x, y) pixel coordinates where the pixel at column `c`
/// and row `r` covers `[c, c + 1) x [r, r + 1)`.
///
/// # Examples
///
/// ```
/// use segmask_core::im::{Shape, ShapeKind};
///
/// let shape = Shape::polygon("lens", vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
/// assert_eq!(shape.kind().unwrap(), ShapeKind::Polygon);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Shape {
    pub label: String,
    pub points: Vec<[f32; 2]>,
    #[serde(default)]
    pub shape_type: Option<String>,
}

impl Shape {
    /// Initialize a polygon shape
    pub fn polygon(label: &str, points: Vec<[f32; 2]>) -> Self {
        Shape {
            label: label.to_string(),
            points,
            shape_type: Some("polygon".to_string()),
        }
    }

    /// Initialize a rectangle shape from two opposite corners
    pub fn rectangle(label: &str, a: [f32; 2], b: [f32; 2]) -> Self {
        Shape {
            label: label.to_string(),
            points: vec![a, b],
            shape_type: Some("rectangle".to_string()),
        }
    }

    /// Initialize a circle shape from its center and a point on its rim
    pub fn circle(label: &str, center: [f32; 2], rim: [f32; 2]) -> Self {
        Shape {
            label: label.to_string(),
            points: vec![center, rim],
            shape_type: Some("circle".to_string()),
        }
    }

    /// Geometry of the shape, polygon when no type is recorded
    pub fn kind(&self) -> Result<ShapeKind, SegmaskError> {
        match self.shape_type.as_deref() {
            None | Some("polygon") => Ok(ShapeKind::Polygon),
            Some("rectangle") => Ok(ShapeKind::Rectangle),
            Some("circle") => Ok(ShapeKind::Circle),
            Some(other) => Err(SegmaskError::UnsupportedShape(other.to_string())),
        }
    }
}

/// A single-image annotation as written by LabelMe
///
/// Only the keys needed for rasterization are read and any other
/// keys (e.g. `imageData`, `flags`, `version`) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub image_width: Option<u32>,
    #[serde(default)]
    pub image_height: Option<u32>,
}

// >>> I/O METHODS

impl Annotation {
    /// Open an annotation from a json file
    ///
    /// ```no_run
    /// use segmask_core::im::Annotation;
    /// let annotation = Annotation::open("sample_001.json");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Annotation, SegmaskError> {
        let mut contents = String::new();

        File::open(path.as_ref())
            .map_err(|err| SegmaskError::NoFileError(err.to_string()))?
            .read_to_string(&mut contents)
            .map_err(|err| SegmaskError::AnnotationReadError(err.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse an annotation from a json string
    pub fn from_json(contents: &str) -> Result<Annotation, SegmaskError> {
        serde_json::from_str(contents)
            .map_err(|err| SegmaskError::AnnotationReadError(err.to_string()))
    }

    /// Path of the source image resolved against the annotation's directory
    ///
    /// Windows separators in `imagePath` are normalized so annotations made
    /// on one platform resolve on another.
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory containing the annotation file
    pub fn image_file<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf, SegmaskError> {
        let relative = self
            .image_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                SegmaskError::AnnotationReadError("No 'imagePath' found in annotation.".to_string())
            })?;

        Ok(directory.as_ref().join(relative.replace('\\', "/")))
    }

    /// Image dimensions recorded in the annotation, if both are present
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image_width.zip(self.image_height)
    }
}

// <<< I/O METHODS
