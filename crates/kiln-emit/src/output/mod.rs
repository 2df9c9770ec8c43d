//! Writing generated modules under the server output directory.

pub mod writer;

pub use writer::{OutputWriter, validate_output_path};
