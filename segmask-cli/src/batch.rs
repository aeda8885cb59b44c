// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use colored::Colorize;
use kdam::TqdmParallelIterator;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use segmask_core::constant;
use segmask_core::error::SegmaskError;
use segmask_core::im::LabelRegistry;
use segmask_core::ut;

/// Result of processing a single sample directory
#[derive(Debug)]
pub enum Outcome {
    /// Outputs were written, possibly with warnings
    Written(Vec<String>),
    /// Nothing was written for the sample
    Skipped(String),
}

/// Print an error to stderr and exit
pub fn fatal<T: Display>(stage: &str, message: T) -> ! {
    eprintln!("[segmask::{}] {} {}", stage, "ERROR:".red().bold(), message);
    std::process::exit(1);
}

/// Print a warning to stderr
pub fn warn<T: Display>(stage: &str, message: T) {
    eprintln!(
        "[segmask::{}] {} {}",
        stage,
        "WARNING:".yellow().bold(),
        message
    );
}

/// Size the global thread pool if a thread count was provided
pub fn configure_threads(threads: Option<usize>, stage: &str) {
    if let Some(threads) = threads {
        if threads < 1 {
            fatal(stage, "Threads must be set to a positive integer if provided.");
        }

        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .unwrap_or_else(|err| fatal(stage, format!("Could not build thread pool. {}", err)));
    }
}

/// Load the label registry or exit
pub fn load_registry(labels: &str, ignore: &str, background: &str, stage: &str) -> LabelRegistry {
    LabelRegistry::open_with_markers(labels, ignore, background)
        .unwrap_or_else(|err| fatal(stage, err))
}

/// Collect sample directories below an input root or exit
pub fn collect_samples(input: &str, stage: &str) -> Vec<PathBuf> {
    if !Path::new(input).is_dir() {
        fatal(stage, format!("Input directory {} does not exist.", input));
    }

    ut::path::collect_sample_dirs(input).unwrap_or_else(|err| fatal(stage, err))
}

/// Create the output root or exit
///
/// Existing output directories are reused and their files may be overwritten.
pub fn prepare_output(output: &str, stage: &str) -> PathBuf {
    let path = Path::new(output);

    if path.exists() && !path.is_dir() {
        fatal(
            stage,
            format!("Output path {} exists and is not a directory.", output),
        );
    }

    if path.is_dir() {
        warn(
            stage,
            format!(
                "Output directory {} already exists. Existing files may be overwritten.",
                output
            ),
        );
    }

    ut::path::create_directory(path).unwrap_or_else(|err| fatal(stage, err))
}

/// Run a per-sample task over every sample in parallel
///
/// Failures never stop the batch. They are printed as warnings and written
/// to the error report in the output directory. A report left by an earlier
/// run is removed when every sample succeeds.
///
/// # Arguments
///
/// * `samples` - Sample directories
/// * `output` - Output root receiving the error report
/// * `desc` - Progress bar description
/// * `stage` - Subcommand name used in console messages
/// * `verbose` - Show progress
/// * `task` - Per-sample work
pub fn run_samples<F>(
    samples: &[PathBuf],
    output: &Path,
    desc: &str,
    stage: &str,
    verbose: bool,
    task: F,
) where
    F: Fn(&Path) -> Result<Outcome, SegmaskError> + Send + Sync,
{
    ut::track::progress_log(
        &format!(
            "Detected {} sample directories.",
            ut::track::thousands_format(samples.len())
        ),
        verbose,
    );

    let pb = ut::track::progress_bar(samples.len(), desc, verbose);

    let warning: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());
    let skipped: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());
    let failure: Mutex<Vec<(String, SegmaskError)>> = Mutex::new(Vec::new());

    (0..samples.len())
        .into_par_iter()
        .tqdm_with_bar(pb)
        .for_each(|idx| {
            let sample = ut::path::file_name_string(&samples[idx]);

            match task(&samples[idx]) {
                Ok(Outcome::Written(messages)) => {
                    let mut warning = warning.lock().unwrap();
                    for message in messages {
                        warning.push((sample.clone(), message));
                    }
                }
                Ok(Outcome::Skipped(message)) => {
                    skipped.lock().unwrap().push((sample, message));
                }
                Err(err) => {
                    failure.lock().unwrap().push((sample, err));
                }
            }
        });

    let mut warning = warning.into_inner().unwrap();
    let mut skipped = skipped.into_inner().unwrap();
    let mut failure = failure.into_inner().unwrap();

    warning.sort_by(|a, b| a.0.cmp(&b.0));
    skipped.sort_by(|a, b| a.0.cmp(&b.0));
    failure.sort_by(|a, b| a.0.cmp(&b.0));

    if verbose {
        println!();
    }

    for (sample, message) in warning.iter().chain(skipped.iter()) {
        warn(stage, format!("{}: {}", sample, message));
    }

    for (sample, err) in failure.iter() {
        warn(stage, format!("{}: {}", sample, err));
    }

    let processed = samples.len() - skipped.len() - failure.len();

    ut::track::progress_log(
        &format!(
            "Complete. {} samples processed. {} skipped. {} failed.",
            ut::track::thousands_format(processed),
            ut::track::thousands_format(skipped.len()),
            ut::track::thousands_format(failure.len()),
        ),
        verbose,
    );

    let report = output.join(constant::ERROR_REPORT);

    if failure.is_empty() {
        if report.is_file() {
            std::fs::remove_file(&report).unwrap_or_else(|err| {
                fatal(
                    stage,
                    format!("Could not remove stale error report. {}", err),
                )
            });
        }
        return;
    }

    let lines: Vec<String> = failure
        .iter()
        .map(|(sample, err)| format!("{}\t{}", sample, err))
        .collect();

    std::fs::write(&report, lines.join("\n"))
        .unwrap_or_else(|err| fatal(stage, format!("Could not write error report. {}", err)));
}
