pub mod model;

pub use model::{Property, TagCount};
