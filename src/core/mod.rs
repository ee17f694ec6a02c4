pub mod paths;

pub use paths::{dirname, join_normalized, normalize, relative_to};
