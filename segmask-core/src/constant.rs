// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

// Image formats the source image of an annotation can be read from
pub const IMAGE_DYNAMIC_FORMATS: [&str; 17] = [
    "avif", "bmp", "dds", "hdr", "ico", "jpeg", "jpg", "exr", "png", "pbm", "pgm", "ppm", "qoi",
    "tga", "tif", "tiff", "webp",
];

// Annotation file formats
pub const ANNOTATION_FORMATS: [&str; 1] = ["json"];

// Default reserved names for the first two lines of a label list
pub const IGNORE_MARKER: &str = "ignore-class";
pub const BACKGROUND_MARKER: &str = "background-class";

// Reserved class ids
pub const IGNORE_ID: i32 = -1;
pub const BACKGROUND_ID: i32 = 0;

// Binary mask values
pub const MASK_FOREGROUND: u8 = 255;
pub const MASK_BACKGROUND: u8 = 0;

// An 8-bit palette image stores the ignore id as 255 so 254 is the largest class id
pub const PALETTE_SIZE: usize = 256;
pub const PALETTE_IGNORE_INDEX: u8 = 255;
pub const MAX_PALETTE_ID: i32 = 254;

// Weight of the class color when blended with the source image
pub const VISUALIZATION_ALPHA: f32 = 0.5;

// Per-sample output directories written by rasterization
pub const JPEG_IMAGES_DIR: &str = "JPEGImages";
pub const SEGMENTATION_CLASS_DIR: &str = "SegmentationClass";
pub const SEGMENTATION_CLASS_PNG_DIR: &str = "SegmentationClassPNG";
pub const SEGMENTATION_VISUALIZATION_DIR: &str = "SegmentationClassVisualization";

// Prefix of the per-class mask directories written by extraction
pub const MASK_DIR_PREFIX: &str = "Mask_";

// Batch failure report
pub const ERROR_REPORT: &str = "errors.tsv";
