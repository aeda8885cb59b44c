mod indexed;
mod npy;

pub use indexed::read_indexed_png;
pub use indexed::write_indexed_png;

pub use npy::read_numpy_i32;
pub use npy::write_numpy;
