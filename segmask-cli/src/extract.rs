// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use clap::Args;

use segmask_core::constant;
use segmask_core::error::SegmaskError;
use segmask_core::im::{ClassIndexRaster, LabelRegistry};
use segmask_core::ut;

use crate::batch::{self, Outcome};

const STAGE: &str = "extract";

#[derive(Debug, Args)]
#[command(about = "Split class-index images into one binary mask per class.")]
pub struct ExtractArgs {
    #[arg(
        short = 'i',
        long,
        help = "Rasterize output directory with one sub-directory per sample.",
        required = true
    )]
    pub input: Option<String>,

    #[arg(short = 'o', long, help = "Output directory for mask folders.", required = true)]
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

    #[arg(long, help = "Check that extracted masks recombine into the class-index image.")]
    pub verify: bool,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

pub fn extract(args: &ExtractArgs) {
    batch::configure_threads(args.threads, STAGE);

    let labels = args.labels.to_owned().unwrap_or_default();
    let input = args.input.to_owned().unwrap_or_default();
    let output = args.output.to_owned().unwrap_or_default();

    let registry =
        batch::load_registry(&labels, &args.ignore_marker, &args.background_marker, STAGE);

    let classes = registry.extractable_ids();

    if classes.is_empty() {
        batch::fatal(
            STAGE,
            format!("The label list {} has no extractable classes.", labels),
        );
    }

    ut::track::progress_log(
        &format!(
            "Extracting {} classes: {}.",
            ut::track::thousands_format(classes.len()),
            classes
                .iter()
                .map(|(_, name)| *name)
                .collect::<Vec<&str>>()
                .join(", ")
        ),
        args.verbose,
    );

    let samples = batch::collect_samples(&input, STAGE);
    let output = batch::prepare_output(&output, STAGE);

    let mask_dirs: Vec<(i32, PathBuf)> = classes
        .iter()
        .map(|(id, name)| {
            let dir = output.join(format!("{}{}", constant::MASK_DIR_PREFIX, name));
            ut::path::create_directory(&dir)
                .map(|dir| (*id, dir))
                .unwrap_or_else(|err| batch::fatal(STAGE, err))
        })
        .collect();

    batch::run_samples(
        &samples,
        &output,
        "Extracting masks",
        STAGE,
        args.verbose,
        |sample| extract_sample(sample, &mask_dirs, &registry, args.verify),
    );
}

/// Write one binary mask per extractable class for a sample
///
/// The first png in `<sample>/SegmentationClassPNG` is read and each mask
/// is written under the same file name into its class directory.
///
/// # Arguments
///
/// * `sample` - Sample directory produced by rasterize
/// * `mask_dirs` - Output directory of each extractable class id
/// * `registry` - Label registry
/// * `verify` - Recombine the masks and compare against the source raster
pub fn extract_sample(
    sample: &Path,
    mask_dirs: &[(i32, PathBuf)],
    registry: &LabelRegistry,
    verify: bool,
) -> Result<Outcome, SegmaskError> {
    let class_dir = sample.join(constant::SEGMENTATION_CLASS_PNG_DIR);

    if !class_dir.is_dir() {
        return Ok(Outcome::Skipped(format!(
            "No {} directory found. Sample skipped.",
            constant::SEGMENTATION_CLASS_PNG_DIR
        )));
    }

    let files = ut::path::collect_file_paths(&class_dir, &["png"])?;

    let Some(file) = files.first() else {
        return Ok(Outcome::Skipped(format!(
            "No png found in {}. Sample skipped.",
            constant::SEGMENTATION_CLASS_PNG_DIR
        )));
    };

    let mut warnings = Vec::new();

    if files.len() > 1 {
        warnings.push(format!(
            "Found {} class-index images, using {}.",
            files.len(),
            ut::path::file_name_string(file)
        ));
    }

    let raster = ClassIndexRaster::open(file)?;
    let masks = raster.extract_all(registry);
    let name = ut::path::file_name_string(file);

    for (id, mask) in masks.iter() {
        let (_, dir) = mask_dirs
            .iter()
            .find(|(dir_id, _)| dir_id == id)
            .ok_or_else(|| {
                SegmaskError::DirError(format!(
                    "No mask directory for class '{}' (id {}).",
                    registry.id_to_name(*id).unwrap_or_default(),
                    id
                ))
            })?;

        mask.save(dir.join(&name))?;
    }

    if verify {
        raster.verify_masks(&masks)?;
    }

    Ok(Outcome::Written(warnings))
}
