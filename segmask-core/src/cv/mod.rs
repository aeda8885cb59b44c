pub mod colormap;
pub mod rasterize;

pub use colormap::{class_color, label_colormap, visualize};
pub use rasterize::{fill_circle, fill_polygon, rasterize};
