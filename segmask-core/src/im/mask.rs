// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use image::{GrayImage, open as open_dynamic};
use rayon::prelude::*;

use crate::constant::{self, BACKGROUND_ID, IGNORE_ID, MASK_BACKGROUND, MASK_FOREGROUND};
use crate::error::SegmaskError;
use crate::im::{ClassIndexRaster, LabelRegistry, Raster};
use crate::io::write_numpy;

/// A row-major binary mask with foreground 255 and background 0
///
/// # Examples
///
/// ```
/// use segmask_core::im::{BinaryMask, ClassIndexRaster, LabelRegistry};
///
/// let names = ["ignore-class", "background-class", "lens", "cornea"];
/// let registry = LabelRegistry::load(&names).unwrap();
/// let raster = ClassIndexRaster::new(2, 2, vec![1, 0, 0, 0]).unwrap();
///
/// let lens: BinaryMask = raster.extract(1, &registry).unwrap();
/// let cornea: BinaryMask = raster.extract(2, &registry).unwrap();
///
/// assert_eq!(lens.as_raw(), &[255, 0, 0, 0]);
/// assert_eq!(cornea.as_raw(), &[0, 0, 0, 0]);
/// ```
pub type BinaryMask = Raster<u8>;

// >>> I/O METHODS

impl BinaryMask {
    /// Open a binary mask from a grayscale image
    ///
    /// ```no_run
    /// use segmask_core::im::BinaryMask;
    /// let mask = BinaryMask::open("Mask_lens/sample_001.png");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<BinaryMask, SegmaskError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if let Some(ext) = extension {
            if constant::IMAGE_DYNAMIC_FORMATS.iter().any(|e| e == &ext) {
                let image = open_dynamic(&path).map_err(|_| SegmaskError::ImageReadError)?;
                let gray = image.to_luma8();
                return BinaryMask::new(gray.width(), gray.height(), gray.into_raw());
            }
        }

        Err(SegmaskError::ImageExtensionError)
    }

    /// Save a mask as a single-channel 8-bit image or numpy array
    ///
    /// # Arguments
    ///
    /// * `path` - A path to an image with a valid extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SegmaskError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if let Some(ext) = extension {
            if ext == "npy" {
                return write_numpy(
                    path,
                    self.as_raw(),
                    &[self.height() as u64, self.width() as u64],
                );
            }

            if constant::IMAGE_DYNAMIC_FORMATS.iter().any(|e| e == &ext) {
                return GrayImage::from_raw(self.width(), self.height(), self.buffer.clone())
                    .ok_or(SegmaskError::BufferSizeError)?
                    .save(path)
                    .map_err(|_| SegmaskError::ImageWriteError);
            }
        }

        Err(SegmaskError::ImageExtensionError)
    }
}

// <<< I/O METHODS

impl BinaryMask {
    /// Number of foreground pixels
    pub fn foreground_count(&self) -> usize {
        self.iter().filter(|&&p| p == MASK_FOREGROUND).count()
    }
}

// >>> EXTRACTION METHODS

impl ClassIndexRaster {
    /// Extract the binary mask of one extractable class
    ///
    /// A pixel is foreground exactly when its class id equals `target_id`.
    ///
    /// # Arguments
    ///
    /// * `target_id` - An id from `registry.extractable_ids()`
    /// * `registry` - Registry the raster was produced with
    pub fn extract(
        &self,
        target_id: i32,
        registry: &LabelRegistry,
    ) -> Result<BinaryMask, SegmaskError> {
        if !registry.is_extractable(target_id) {
            return Err(SegmaskError::UnknownClass(format!(
                "Class id {} is not an extractable class id.",
                target_id
            )));
        }

        Ok(self.equals(target_id))
    }

    /// Extract the binary masks of every extractable class in id order
    pub fn extract_all(&self, registry: &LabelRegistry) -> Vec<(i32, BinaryMask)> {
        registry
            .extractable_ids()
            .into_par_iter()
            .map(|(id, _)| (id, self.equals(id)))
            .collect()
    }

    fn equals(&self, target_id: i32) -> BinaryMask {
        self.map(|id| {
            if id == target_id {
                MASK_FOREGROUND
            } else {
                MASK_BACKGROUND
            }
        })
    }

    /// Rebuild a class-index raster from per-class binary masks
    ///
    /// Pixels claimed by no mask are background. A pixel claimed by two
    /// different masks is an error.
    ///
    /// # Arguments
    ///
    /// * `width` - Raster width
    /// * `height` - Raster height
    /// * `masks` - (class id, mask) pairs
    pub fn recombine(
        width: u32,
        height: u32,
        masks: &[(i32, &BinaryMask)],
    ) -> Result<ClassIndexRaster, SegmaskError> {
        let mut raster = ClassIndexRaster::filled(width, height, BACKGROUND_ID);

        for (id, mask) in masks {
            if mask.shape() != raster.shape() {
                return Err(SegmaskError::BufferSizeError);
            }

            for (pixel, &value) in raster.buffer.iter_mut().zip(mask.iter()) {
                if value != MASK_FOREGROUND {
                    continue;
                }

                if *pixel != BACKGROUND_ID && *pixel != *id {
                    return Err(SegmaskError::VerificationError(format!(
                        "A pixel is claimed by both class {} and class {}.",
                        pixel, id
                    )));
                }

                *pixel = *id;
            }
        }

        Ok(raster)
    }

    /// Check that masks recombine into this raster
    ///
    /// Ignore pixels fire in no mask, so they are compared as background.
    pub fn verify_masks(&self, masks: &[(i32, BinaryMask)]) -> Result<(), SegmaskError> {
        let masks: Vec<(i32, &BinaryMask)> = masks.iter().map(|(id, mask)| (*id, mask)).collect();
        let recombined = ClassIndexRaster::recombine(self.width(), self.height(), &masks)?;

        let mismatched = self
            .iter()
            .zip(recombined.iter())
            .filter(|&(&expected, &actual)| {
                let expected = if expected == IGNORE_ID {
                    BACKGROUND_ID
                } else {
                    expected
                };
                expected != actual
            })
            .count();

        if mismatched > 0 {
            return Err(SegmaskError::VerificationError(format!(
                "{} of {} pixels differ.",
                mismatched,
                self.len()
            )));
        }

        Ok(())
    }
}

// <<< EXTRACTION METHODS

#[cfg(test)]
mod test {

    use super::*;

    fn registry() -> LabelRegistry {
        LabelRegistry::load(&["ignore-class", "background-class", "lens", "cornea", "iris"])
            .unwrap()
    }

    fn raster() -> ClassIndexRaster {
        #[rustfmt::skip]
        let data = vec![
            0, 1, 1, 0,
            2, 2, 1, -1,
            3, 0, -1, 2,
        ];
        ClassIndexRaster::new(4, 3, data).unwrap()
    }

    #[test]
    fn test_extract_end_to_end() {
        let registry =
            LabelRegistry::load(&["ignore-class", "background-class", "lens", "cornea"]).unwrap();
        let raster = ClassIndexRaster::new(2, 2, vec![1, 0, 0, 0]).unwrap();

        assert_eq!(raster.extract(1, &registry).unwrap().as_raw(), &[255, 0, 0, 0]);
        assert_eq!(raster.extract(2, &registry).unwrap().as_raw(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_extract_foreground_count() {
        let raster = raster();
        let registry = registry();

        for (id, _) in registry.extractable_ids() {
            let mask = raster.extract(id, &registry).unwrap();
            assert_eq!(mask.shape(), raster.shape());
            assert_eq!(mask.foreground_count(), raster.count(id));
            assert!(mask.iter().all(|&p| p == 0 || p == 255));
        }
    }

    #[test]
    fn test_extract_reserved_ids() {
        let raster = raster();
        let registry = registry();

        for id in [-1, 0, 4, 100, -7] {
            assert!(matches!(
                raster.extract(id, &registry),
                Err(SegmaskError::UnknownClass(_))
            ));
        }
    }

    #[test]
    fn test_extract_all() {
        let raster = raster();
        let registry = registry();

        let masks = raster.extract_all(&registry);
        let ids: Vec<i32> = masks.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        for (id, mask) in &masks {
            assert_eq!(mask, &raster.extract(*id, &registry).unwrap());
        }
    }

    #[test]
    fn test_recombine_roundtrip() {
        let raster = raster();
        let masks = raster.extract_all(&registry());

        let pairs: Vec<(i32, &BinaryMask)> = masks.iter().map(|(id, m)| (*id, m)).collect();
        let recombined = ClassIndexRaster::recombine(4, 3, &pairs).unwrap();

        let expected: Vec<i32> = raster.iter().map(|&p| p.max(0)).collect();
        assert_eq!(recombined.as_raw(), expected.as_slice());
        assert!(raster.verify_masks(&masks).is_ok());
    }

    #[test]
    fn test_recombine_order_independent() {
        let raster = raster();
        let mut masks = raster.extract_all(&registry());
        masks.reverse();
        assert!(raster.verify_masks(&masks).is_ok());
    }

    #[test]
    fn test_recombine_overlap() {
        let a = BinaryMask::new(2, 1, vec![255, 0]).unwrap();
        let b = BinaryMask::new(2, 1, vec![255, 255]).unwrap();

        assert!(matches!(
            ClassIndexRaster::recombine(2, 1, &[(1, &a), (2, &b)]),
            Err(SegmaskError::VerificationError(_))
        ));
    }

    #[test]
    fn test_verify_masks_mismatch() {
        let raster = raster();
        let mut masks = raster.extract_all(&registry());
        masks.pop();

        assert!(matches!(
            raster.verify_masks(&masks),
            Err(SegmaskError::VerificationError(_))
        ));
    }

    #[test]
    fn test_mask_save() {
        const TEST_DEFAULT: &str = "TEST_SAVE_DEFAULT_BINARY_MASK.png";
        const TEST_NUMPY: &str = "TEST_SAVE_NUMPY_BINARY_MASK.npy";

        let mask = BinaryMask::new(2, 2, vec![0, 255, 0, 0]).unwrap();

        mask.save(TEST_DEFAULT).unwrap();
        mask.save(TEST_NUMPY).unwrap();

        let opened = BinaryMask::open(TEST_DEFAULT).unwrap();
        let bytes = std::fs::read(TEST_NUMPY).unwrap();

        std::fs::remove_file(TEST_DEFAULT).unwrap();
        std::fs::remove_file(TEST_NUMPY).unwrap();

        assert_eq!(opened, mask);
        assert!(bytes.starts_with(b"\x93NUMPY"));
        assert!(mask.save("TEST_MASK.txt").is_err());
    }
}
