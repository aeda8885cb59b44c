// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use clap::Args;

use segmask_core::constant;
use segmask_core::cv;
use segmask_core::error::SegmaskError;
use segmask_core::im::{Annotation, LabelRegistry, Shape};
use segmask_core::ut;

use crate::batch::{self, Outcome};

const STAGE: &str = "rasterize";

#[derive(Debug, Args)]
#[command(about = "Rasterize per-sample LabelMe annotations into class-index images.")]
pub struct RasterizeArgs {
    #[arg(
        short = 'i',
        long,
        help = "Directory containing one sub-directory per sample.",
        required = true
    )]
    pub input: Option<String>,

    #[arg(short = 'o', long, help = "Output directory.", required = true)]
    pub output: Option<String>,

    #[arg(short = 'l', long, help = "Label list file.", required = true)]
    pub labels: Option<String>,

    #[arg(
        long,
        help = "Name of the ignore class on the first line of the label list.",
        default_value = constant::IGNORE_MARKER
    )]
    pub ignore_marker: String,

    #[arg(
        long,
        help = "Name of the background class on the second line of the label list.",
        default_value = constant::BACKGROUND_MARKER
    )]
    pub background_marker: String,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

pub fn rasterize(args: &RasterizeArgs) {
    batch::configure_threads(args.threads, STAGE);

    let labels = args.labels.to_owned().unwrap_or_default();
    let input = args.input.to_owned().unwrap_or_default();
    let output = args.output.to_owned().unwrap_or_default();

    let registry =
        batch::load_registry(&labels, &args.ignore_marker, &args.background_marker, STAGE);

    if let Err(err) = registry.check_palette_capacity() {
        batch::fatal(STAGE, err);
    }

    ut::track::progress_log(
        &format!(
            "Loaded {} classes from {}.",
            ut::track::thousands_format(registry.len()),
            labels
        ),
        args.verbose,
    );

    let samples = batch::collect_samples(&input, STAGE);
    let output = batch::prepare_output(&output, STAGE);
    let colormap = cv::label_colormap(constant::PALETTE_SIZE);

    batch::run_samples(
        &samples,
        &output,
        "Rasterizing annotations",
        STAGE,
        args.verbose,
        |sample| rasterize_sample(sample, &output, &registry, &colormap),
    );
}

/// Rasterize the annotation of one sample and write its outputs
///
/// # Arguments
///
/// * `sample` - Sample directory containing a json annotation and its image
/// * `output` - Output root, outputs land in `<output>/<sample name>/`
/// * `registry` - Label registry
/// * `colormap` - Class colors for the visualization
pub fn rasterize_sample(
    sample: &Path,
    output: &Path,
    registry: &LabelRegistry,
    colormap: &[[u8; 3]],
) -> Result<Outcome, SegmaskError> {
    let annotations =
        ut::path::collect_file_paths(sample, constant::ANNOTATION_FORMATS.as_slice())?;

    let Some(annotation_file) = annotations.first() else {
        return Ok(Outcome::Skipped(
            "No json annotation file found. Sample skipped.".to_string(),
        ));
    };

    let mut warnings = Vec::new();

    if annotations.len() > 1 {
        warnings.push(format!(
            "Found {} annotation files, using {}.",
            annotations.len(),
            ut::path::file_name_string(annotation_file)
        ));
    }

    let annotation = Annotation::open(annotation_file).map_err(|err| match err {
        SegmaskError::NoFileError(message) => SegmaskError::AnnotationReadError(message),
        other => other,
    })?;

    let image_file = annotation.image_file(sample)?;

    if !image_file.is_file() {
        return Err(SegmaskError::SourceImageUnavailable(format!(
            "{} does not exist.",
            image_file.display()
        )));
    }

    let image = image::open(&image_file).map_err(|err| {
        SegmaskError::SourceImageUnavailable(format!("{}: {}", image_file.display(), err))
    })?;

    let (width, height) = (image.width(), image.height());

    if let Some((w, h)) = annotation.dimensions() {
        if (w, h) != (width, height) {
            warnings.push(format!(
                "Annotation records a {}x{} image but {} is {}x{}. Using the image dimensions.",
                w,
                h,
                ut::path::file_name_string(&image_file),
                width,
                height
            ));
        }
    }

    let (shapes, unsupported): (Vec<Shape>, Vec<Shape>) = annotation
        .shapes
        .iter()
        .cloned()
        .partition(|shape| shape.kind().is_ok());

    for shape in &unsupported {
        warnings.push(format!(
            "Skipped '{}' shape with label '{}'. It is not a polygon, rectangle or circle.",
            shape.shape_type.as_deref().unwrap_or_default(),
            shape.label
        ));
    }

    let raster = cv::rasterize(width, height, &shapes, registry)?;

    let base = ut::path::file_stem_string(annotation_file);
    let root = output.join(ut::path::file_name_string(sample));

    let jpeg_dir = ut::path::create_directory(root.join(constant::JPEG_IMAGES_DIR))?;
    let npy_dir = ut::path::create_directory(root.join(constant::SEGMENTATION_CLASS_DIR))?;
    let png_dir = ut::path::create_directory(root.join(constant::SEGMENTATION_CLASS_PNG_DIR))?;
    let vis_dir =
        ut::path::create_directory(root.join(constant::SEGMENTATION_VISUALIZATION_DIR))?;

    image
        .to_rgb8()
        .save(jpeg_dir.join(&base).with_extension("jpg"))
        .map_err(|_| SegmaskError::ImageWriteError)?;

    raster.save_npy(npy_dir.join(&base).with_extension("npy"))?;
    raster.save_png(png_dir.join(&base).with_extension("png"))?;

    cv::visualize(&raster, &image.to_luma8(), colormap)?
        .save(vis_dir.join(&base).with_extension("jpg"))
        .map_err(|_| SegmaskError::ImageWriteError)?;

    Ok(Outcome::Written(warnings))
}

#[cfg(test)]
mod test {

    use super::*;

    use image::{GrayImage, Luma};
    use segmask_core::im::ClassIndexRaster;

    const ANNOTATION: &str = r#"{
        "version": "5.2.1",
        "shapes": [
            {"label": "lens", "points": [[0, 0], [2, 0], [2, 2], [0, 2]], "shape_type": "polygon"},
            {"label": "cornea", "points": [[2, 2], [4, 4]], "shape_type": "rectangle"}
        ],
        "imagePath": "scan.png",
        "imageWidth": 4,
        "imageHeight": 4
    }"#;

    fn registry() -> LabelRegistry {
        LabelRegistry::load(&["ignore-class", "background-class", "lens", "cornea"]).unwrap()
    }

    #[test]
    fn test_rasterize_sample() {
        let root = Path::new("TEST_RASTERIZE_SAMPLE");
        let sample = root.join("input").join("sample_001");
        let output = root.join("output");

        ut::path::create_directory(&sample).unwrap();
        std::fs::write(sample.join("sample_001.json"), ANNOTATION).unwrap();
        GrayImage::from_pixel(4, 4, Luma([120]))
            .save(sample.join("scan.png"))
            .unwrap();

        let colormap = cv::label_colormap(constant::PALETTE_SIZE);
        let outcome = rasterize_sample(&sample, &output, &registry(), &colormap).unwrap();

        let written = output.join("sample_001");
        let png = ClassIndexRaster::open(
            written
                .join(constant::SEGMENTATION_CLASS_PNG_DIR)
                .join("sample_001.png"),
        );
        let npy = ClassIndexRaster::open(
            written
                .join(constant::SEGMENTATION_CLASS_DIR)
                .join("sample_001.npy"),
        );
        let jpeg = written
            .join(constant::JPEG_IMAGES_DIR)
            .join("sample_001.jpg")
            .is_file();
        let vis = written
            .join(constant::SEGMENTATION_VISUALIZATION_DIR)
            .join("sample_001.jpg")
            .is_file();

        std::fs::remove_dir_all(root).unwrap();

        #[rustfmt::skip]
        let expected = vec![
            1, 1, 0, 0,
            1, 1, 0, 0,
            0, 0, 2, 2,
            0, 0, 2, 2,
        ];

        assert!(matches!(outcome, Outcome::Written(ref w) if w.is_empty()));
        assert_eq!(png.unwrap().as_raw(), expected.as_slice());
        assert_eq!(npy.unwrap().as_raw(), expected.as_slice());
        assert!(jpeg);
        assert!(vis);
    }

    #[test]
    fn test_rasterize_sample_without_annotation() {
        let root = Path::new("TEST_RASTERIZE_SAMPLE_EMPTY");
        let sample = root.join("sample_001");
        ut::path::create_directory(&sample).unwrap();

        let colormap = cv::label_colormap(constant::PALETTE_SIZE);
        let outcome = rasterize_sample(&sample, &root.join("output"), &registry(), &colormap);

        let written = root.join("output").exists();
        std::fs::remove_dir_all(root).unwrap();

        assert!(matches!(outcome, Ok(Outcome::Skipped(_))));
        assert!(!written);
    }

    #[test]
    fn test_rasterize_sample_missing_image() {
        let root = Path::new("TEST_RASTERIZE_SAMPLE_MISSING_IMAGE");
        let sample = root.join("sample_001");
        ut::path::create_directory(&sample).unwrap();
        std::fs::write(sample.join("sample_001.json"), ANNOTATION).unwrap();

        let colormap = cv::label_colormap(constant::PALETTE_SIZE);
        let outcome = rasterize_sample(&sample, &root.join("output"), &registry(), &colormap);

        std::fs::remove_dir_all(root).unwrap();

        assert!(matches!(
            outcome,
            Err(SegmaskError::SourceImageUnavailable(_))
        ));
    }

    #[test]
    fn test_rasterize_sample_dimension_warning() {
        let root = Path::new("TEST_RASTERIZE_SAMPLE_DIMENSIONS");
        let sample = root.join("sample_001");
        ut::path::create_directory(&sample).unwrap();
        std::fs::write(sample.join("sample_001.json"), ANNOTATION).unwrap();
        GrayImage::new(6, 5).save(sample.join("scan.png")).unwrap();

        let colormap = cv::label_colormap(constant::PALETTE_SIZE);
        let outcome = rasterize_sample(&sample, &root.join("output"), &registry(), &colormap);

        std::fs::remove_dir_all(root).unwrap();

        match outcome {
            Ok(Outcome::Written(warnings)) => {
                assert_eq!(warnings.len(), 1);
                assert!(warnings[0].contains("4x4"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_rasterize_sample_skips_unsupported_shapes() {
        let root = Path::new("TEST_RASTERIZE_SAMPLE_UNSUPPORTED");
        let sample = root.join("sample_001");
        let output = root.join("output");
        ut::path::create_directory(&sample).unwrap();

        let annotation = ANNOTATION.replace(
            r#""shape_type": "polygon"},"#,
            r#""shape_type": "polygon"},
            {"label": "lens", "points": [[0, 3], [3, 3]], "shape_type": "line"},
            {"label": "cornea", "points": [[1, 1]], "shape_type": "point"},"#,
        );

        std::fs::write(sample.join("sample_001.json"), annotation).unwrap();
        GrayImage::new(4, 4).save(sample.join("scan.png")).unwrap();

        let colormap = cv::label_colormap(constant::PALETTE_SIZE);
        let outcome = rasterize_sample(&sample, &output, &registry(), &colormap);

        let png = ClassIndexRaster::open(
            output
                .join("sample_001")
                .join(constant::SEGMENTATION_CLASS_PNG_DIR)
                .join("sample_001.png"),
        );

        std::fs::remove_dir_all(root).unwrap();

        match outcome {
            Ok(Outcome::Written(warnings)) => {
                assert_eq!(warnings.len(), 2);
                assert!(warnings[0].contains("'line'"));
                assert!(warnings[1].contains("'point'"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        #[rustfmt::skip]
        let expected = vec![
            1, 1, 0, 0,
            1, 1, 0, 0,
            0, 0, 2, 2,
            0, 0, 2, 2,
        ];

        assert_eq!(png.unwrap().as_raw(), expected.as_slice());
    }
}
