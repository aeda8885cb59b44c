// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::path::{Path, PathBuf};

use crate::error::SegmaskError;

/// Create a directory and any missing parents, keeping existing contents
///
/// # Arguments
///
/// * `directory` - Path to the directory
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use segmask_core::ut::path::create_directory;
///
/// let base = Path::new("TEST_CREATE_DIRECTORY/Mask_lens");
///
/// create_directory(base).unwrap();
/// create_directory(base).unwrap();
/// assert!(base.is_dir());
///
/// std::fs::remove_dir_all("TEST_CREATE_DIRECTORY").unwrap();
/// ```
pub fn create_directory<P: AsRef<Path>>(directory: P) -> Result<PathBuf, SegmaskError> {
    let directory = directory.as_ref();

    std::fs::create_dir_all(directory)
        .map_err(|err| SegmaskError::DirError(format!("{}: {}", directory.display(), err)))?;

    Ok(directory.to_path_buf())
}

/// Collect the sub-directories of a directory in sorted order
///
/// # Arguments
///
/// * `directory` - Path to directory containing one folder per sample
pub fn collect_sample_dirs<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>, SegmaskError> {
    let message = directory.as_ref().display().to_string();

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(directory)
        .map_err(|_| SegmaskError::DirError(message))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    dirs.sort_unstable();

    Ok(dirs)
}

/// Collect file paths from a directory by extension
///
/// Extensions are matched case-insensitively and paths are returned sorted.
///
/// # Arguments
///
/// * `directory` - Path to directory containing files
/// * `valid_ext` - Lowercase extensions to include
///
/// # Examples
///
/// ```no_run
/// use segmask_core::ut::path::collect_file_paths;
/// use segmask_core::constant::ANNOTATION_FORMATS;
/// let files = collect_file_paths("sample_001/", ANNOTATION_FORMATS.as_slice());
/// ```
pub fn collect_file_paths<P: AsRef<Path>>(
    directory: P,
    valid_ext: &[&str],
) -> Result<Vec<PathBuf>, SegmaskError> {
    let message = directory.as_ref().display().to_string();

    let mut files: Vec<PathBuf> = std::fs::read_dir(directory)
        .map_err(|_| SegmaskError::DirError(message))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| valid_ext.contains(&ext.to_lowercase().as_str()))
        })
        .collect();

    files.sort_unstable();

    Ok(files)
}

/// Name of the final path component as a string
pub fn file_name_string<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// File stem of a path as a string
pub fn file_stem_string<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}
