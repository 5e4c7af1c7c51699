pub mod dataset;
pub mod digest;

pub use dataset::*;
pub use digest::*;
