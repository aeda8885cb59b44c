// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::HashMap;
use std::path::Path;

use crate::constant::{BACKGROUND_ID, BACKGROUND_MARKER, IGNORE_MARKER, MAX_PALETTE_ID};
use crate::error::SegmaskError;

/// An ordered vocabulary of class names with contiguous integer ids
///
/// The first entry is the ignore class (id -1), the second is the
/// background class (id 0) and every following entry is an extractable
/// semantic class numbered from 1 in list order. The registry is loaded
/// once per batch and shared read-only between samples.
///
/// # Examples
///
/// ```
/// use segmask_core::im::LabelRegistry;
///
/// let lines = ["ignore-class", "background-class", "lens", "cornea"];
/// let registry = LabelRegistry::load(&lines).unwrap();
///
/// assert_eq!(registry.name_to_id("ignore-class").unwrap(), -1);
/// assert_eq!(registry.name_to_id("background-class").unwrap(), 0);
/// assert_eq!(registry.name_to_id("lens").unwrap(), 1);
/// assert_eq!(registry.name_to_id("cornea").unwrap(), 2);
/// assert_eq!(registry.extractable_ids(), vec![(1, "lens"), (2, "cornea")]);
/// ```
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    names: Vec<String>,
    ids: HashMap<String, i32>,
}

impl LabelRegistry {
    /// Build a registry from label lines using the default reserved markers
    ///
    /// # Arguments
    ///
    /// * `lines` - Ordered class names, starting with the ignore and background markers
    pub fn load<S: AsRef<str>>(lines: &[S]) -> Result<LabelRegistry, SegmaskError> {
        Self::load_with_markers(lines, IGNORE_MARKER, BACKGROUND_MARKER)
    }

    /// Build a registry from label lines with custom reserved markers
    ///
    /// # Arguments
    ///
    /// * `lines` - Ordered class names, starting with the ignore and background markers
    /// * `ignore` - Name required on the first line
    /// * `background` - Name required on the second line
    ///
    /// # Examples
    ///
    /// ```
    /// use segmask_core::im::LabelRegistry;
    ///
    /// let lines = ["__ignore__", "_background_", "iris"];
    /// let registry = LabelRegistry::load_with_markers(&lines, "__ignore__", "_background_");
    /// assert_eq!(registry.unwrap().name_to_id("iris").unwrap(), 1);
    ///
    /// let registry = LabelRegistry::load(&lines);
    /// assert!(registry.is_err());
    /// ```
    pub fn load_with_markers<S: AsRef<str>>(
        lines: &[S],
        ignore: &str,
        background: &str,
    ) -> Result<LabelRegistry, SegmaskError> {
        let names: Vec<String> = lines
            .iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if names.len() < 2 {
            return Err(SegmaskError::InvalidLabelFile(format!(
                "Expected at least the '{}' and '{}' lines but found {} class names.",
                ignore,
                background,
                names.len()
            )));
        }

        if names[0] != ignore {
            return Err(SegmaskError::InvalidLabelFile(format!(
                "First line must be '{}' but found '{}'.",
                ignore, names[0]
            )));
        }

        if names[1] != background {
            return Err(SegmaskError::InvalidLabelFile(format!(
                "Second line must be '{}' but found '{}'.",
                background, names[1]
            )));
        }

        let mut ids: HashMap<String, i32> = HashMap::with_capacity(names.len());

        for (position, name) in names.iter().enumerate() {
            let id = position as i32 - 1;
            if ids.insert(name.clone(), id).is_some() {
                return Err(SegmaskError::InvalidLabelFile(format!(
                    "Class name '{}' is listed more than once.",
                    name
                )));
            }
        }

        Ok(LabelRegistry { names, ids })
    }

    /// Read a label list from a text file with the default reserved markers
    ///
    /// ```no_run
    /// use segmask_core::im::LabelRegistry;
    /// let registry = LabelRegistry::open("labels.txt");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LabelRegistry, SegmaskError> {
        Self::open_with_markers(path, IGNORE_MARKER, BACKGROUND_MARKER)
    }

    /// Read a label list from a text file with custom reserved markers
    pub fn open_with_markers<P: AsRef<Path>>(
        path: P,
        ignore: &str,
        background: &str,
    ) -> Result<LabelRegistry, SegmaskError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            SegmaskError::NoFileError(format!("{}: {}", path.as_ref().display(), err))
        })?;

        let lines: Vec<&str> = contents.lines().collect();
        Self::load_with_markers(&lines, ignore, background)
    }
}

// >>> LOOKUP METHODS

impl LabelRegistry {
    /// Resolve a class name to its id
    pub fn name_to_id(&self, name: &str) -> Result<i32, SegmaskError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| SegmaskError::UnknownClass(format!("No class named '{}'.", name)))
    }

    /// Resolve an id to its class name, including the reserved classes
    pub fn id_to_name(&self, id: i32) -> Option<&str> {
        usize::try_from(id + 1)
            .ok()
            .and_then(|position| self.names.get(position))
            .map(String::as_str)
    }

    /// Extractable (id, name) pairs in id order, excluding ignore and background
    pub fn extractable_ids(&self) -> Vec<(i32, &str)> {
        self.names
            .iter()
            .enumerate()
            .skip(2)
            .map(|(position, name)| (position as i32 - 1, name.as_str()))
            .collect()
    }

    /// Check if an id refers to an extractable class
    pub fn is_extractable(&self, id: i32) -> bool {
        id > BACKGROUND_ID && id <= self.max_id()
    }

    /// The largest registered class id
    pub fn max_id(&self) -> i32 {
        self.names.len() as i32 - 2
    }

    /// Number of registered classes, including ignore and background
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the registry has no classes
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check that every class id can be stored in an 8-bit palette image
    pub fn check_palette_capacity(&self) -> Result<(), SegmaskError> {
        if self.max_id() > MAX_PALETTE_ID {
            return Err(SegmaskError::ClassIdOverflow(self.max_id()));
        }

        Ok(())
    }
}

// <<< LOOKUP METHODS
