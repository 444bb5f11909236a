pub mod common;
pub mod cost_estimation;
pub mod master;

pub use common::*;
pub use cost_estimation::*;
pub use master::*;
