// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::constant::BACKGROUND_ID;
use crate::error::SegmaskError;
use crate::im::{ClassIndexRaster, LabelRegistry, Shape, ShapeKind};

/// Rasterize labeled shapes into a class-index raster
///
/// Every pixel starts as background and shapes are painted in input order,
/// so a later shape overwrites an earlier one wherever they overlap. A pixel
/// belongs to a shape when its center `(col + 0.5, row + 0.5)` is inside it.
///
/// # Arguments
///
/// * `width` - Width of the source image
/// * `height` - Height of the source image
/// * `shapes` - Labeled shapes in paint order
/// * `registry` - Class name to id mapping
///
/// # Examples
///
/// ```
/// use segmask_core::cv::rasterize;
/// use segmask_core::im::{LabelRegistry, Shape};
///
/// let registry = LabelRegistry::load(&["ignore-class", "background-class", "lens", "cornea"]).unwrap();
/// let shapes = [Shape::polygon("lens", vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.]])];
///
/// let raster = rasterize(2, 2, &shapes, &registry).unwrap();
/// assert_eq!(raster.as_raw(), &[1, 0, 0, 0]);
/// ```
pub fn rasterize(
    width: u32,
    height: u32,
    shapes: &[Shape],
    registry: &LabelRegistry,
) -> Result<ClassIndexRaster, SegmaskError> {
    let mut raster = ClassIndexRaster::filled(width, height, BACKGROUND_ID);

    for (idx, shape) in shapes.iter().enumerate() {
        let id = registry.name_to_id(&shape.label)?;

        let painted = match shape.kind()? {
            ShapeKind::Polygon => fill_polygon(&mut raster, &shape.points, id),
            ShapeKind::Rectangle => match shape.points.as_slice() {
                [a, b] => fill_polygon(&mut raster, &rectangle_points(*a, *b), id),
                points => Err(SegmaskError::DegeneratePolygon(format!(
                    "A rectangle needs 2 corner points but has {}.",
                    points.len()
                ))),
            },
            ShapeKind::Circle => match shape.points.as_slice() {
                [center, rim] => fill_circle(&mut raster, *center, *rim, id),
                points => Err(SegmaskError::DegeneratePolygon(format!(
                    "A circle needs a center and a rim point but has {} points.",
                    points.len()
                ))),
            },
        };

        painted.map_err(|err| match err {
            SegmaskError::DegeneratePolygon(message) => SegmaskError::DegeneratePolygon(format!(
                "{} Shape {} with label '{}'.",
                message, idx, shape.label
            )),
            other => other,
        })?;
    }

    Ok(raster)
}

/// Corners of the axis-aligned rectangle spanned by two opposite corners
pub fn rectangle_points(a: [f32; 2], b: [f32; 2]) -> [[f32; 2]; 4] {
    let (min_x, max_x) = (a[0].min(b[0]), a[0].max(b[0]));
    let (min_y, max_y) = (a[1].min(b[1]), a[1].max(b[1]));
    [[min_x, min_y], [max_x, min_y], [max_x, max_y], [min_x, max_y]]
}

/// Whether all vertices lie on a single line (coincident vertices included)
pub fn is_collinear(points: &[[f32; 2]]) -> bool {
    let Some(&[x0, y0]) = points.first() else {
        return true;
    };

    let mut offsets = points
        .iter()
        .map(|&[x, y]| (x as f64 - x0 as f64, y as f64 - y0 as f64));

    let Some((dx, dy)) = offsets.clone().find(|&(dx, dy)| dx != 0.0 || dy != 0.0) else {
        return true;
    };

    offsets.all(|(ox, oy)| dx * oy - dy * ox == 0.0)
}

/// Fill the interior of a polygon with `value` using an even-odd scanline
///
/// Each row is sampled at `y = row + 0.5`. An edge crosses the scanline when
/// `min(y0, y1) <= y < max(y0, y1)`, so horizontal edges never cross. Crossings
/// are paired into spans and a pixel is filled when its center lies in
/// `[left, right)`. Pixels outside the raster are clipped.
///
/// # Arguments
///
/// * `raster` - Class-index raster to paint into
/// * `points` - Polygon vertices, implicitly closed
/// * `value` - Class id written into covered pixels
///
/// # Examples
///
/// ```
/// use segmask_core::cv::fill_polygon;
/// use segmask_core::im::ClassIndexRaster;
///
/// let mut raster = ClassIndexRaster::filled(4, 3, 0);
/// let points = [[1., 0.], [3., 0.], [3., 2.], [1., 2.]];
///
/// fill_polygon(&mut raster, &points, 2).unwrap();
///
/// assert_eq!(raster.as_raw(), &[0, 2, 2, 0, 0, 2, 2, 0, 0, 0, 0, 0]);
/// ```
pub fn fill_polygon(
    raster: &mut ClassIndexRaster,
    points: &[[f32; 2]],
    value: i32,
) -> Result<(), SegmaskError> {
    if points.len() < 3 {
        return Err(SegmaskError::DegeneratePolygon(format!(
            "A polygon needs at least 3 vertices but has {}.",
            points.len()
        )));
    }

    if points.iter().flatten().any(|v| !v.is_finite()) {
        return Err(SegmaskError::DegeneratePolygon(
            "Polygon has a non-finite vertex.".to_string(),
        ));
    }

    if is_collinear(points) {
        return Err(SegmaskError::DegeneratePolygon(
            "Polygon vertices are collinear.".to_string(),
        ));
    }

    let width = raster.width() as f64;
    let height = raster.height() as f64;

    let (y_min, y_max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p[1] as f64), hi.max(p[1] as f64))
    });

    // First and one-past-last rows whose centers fall in [y_min, y_max)
    let row_start = (y_min - 0.5).ceil().clamp(0.0, height) as u32;
    let row_end = (y_max - 0.5).ceil().clamp(0.0, height) as u32;

    let edges: Vec<([f64; 2], [f64; 2])> = (0..points.len())
        .map(|i| {
            let p0 = points[i];
            let p1 = points[(i + 1) % points.len()];
            (
                [p0[0] as f64, p0[1] as f64],
                [p1[0] as f64, p1[1] as f64],
            )
        })
        .collect();

    let mut crossings: Vec<f64> = Vec::with_capacity(edges.len());

    for row in row_start..row_end {
        let y = row as f64 + 0.5;

        crossings.clear();
        crossings.extend(edges.iter().filter_map(|&([x0, y0], [x1, y1])| {
            if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
                Some(x0 + (y - y0) * (x1 - x0) / (y1 - y0))
            } else {
                None
            }
        }));

        crossings.sort_unstable_by(|a, b| a.total_cmp(b));

        let line = raster.row_mut(row);
        for span in crossings.chunks_exact(2) {
            let from = (span[0] - 0.5).ceil().clamp(0.0, width) as usize;
            let to = (span[1] - 0.5).ceil().clamp(0.0, width) as usize;
            if from < to {
                line[from..to].fill(value);
            }
        }
    }

    Ok(())
}

/// Fill a disk with `value`
///
/// A pixel is filled when its center is strictly closer to `center` than
/// the distance from `center` to `rim`.
///
/// # Arguments
///
/// * `raster` - Class-index raster to paint into
/// * `center` - Center of the circle
/// * `rim` - Any point on the circle
/// * `value` - Class id written into covered pixels
pub fn fill_circle(
    raster: &mut ClassIndexRaster,
    center: [f32; 2],
    rim: [f32; 2],
    value: i32,
) -> Result<(), SegmaskError> {
    if center.iter().chain(rim.iter()).any(|v| !v.is_finite()) {
        return Err(SegmaskError::DegeneratePolygon(
            "Circle has a non-finite point.".to_string(),
        ));
    }

    let (cx, cy) = (center[0] as f64, center[1] as f64);
    let radius = (rim[0] as f64 - cx).hypot(rim[1] as f64 - cy);

    if radius == 0.0 {
        return Err(SegmaskError::DegeneratePolygon(
            "Circle has zero radius.".to_string(),
        ));
    }

    let width = raster.width() as f64;
    let height = raster.height() as f64;

    let row_start = ((cy - radius - 0.5).floor() + 1.0).clamp(0.0, height) as u32;
    let row_end = (cy + radius - 0.5).ceil().clamp(0.0, height) as u32;

    for row in row_start..row_end {
        let dy = row as f64 + 0.5 - cy;
        let reach = radius * radius - dy * dy;
        if reach <= 0.0 {
            continue;
        }

        let dx = reach.sqrt();
        let from = ((cx - dx - 0.5).floor() + 1.0).clamp(0.0, width) as usize;
        let to = (cx + dx - 0.5).ceil().clamp(0.0, width) as usize;
        if from < to {
            raster.row_mut(row)[from..to].fill(value);
        }
    }

    Ok(())
}
