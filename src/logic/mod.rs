pub mod matrix;
pub mod matrix_ops;

pub use matrix::*;
pub use matrix_ops::*;
