mod annotation;
mod index;
mod labels;
mod mask;
mod raster;

pub use raster::Raster;

pub use labels::LabelRegistry;

pub use annotation::Annotation;
pub use annotation::Shape;
pub use annotation::ShapeKind;

pub use index::ClassIndexRaster;
pub use mask::BinaryMask;
