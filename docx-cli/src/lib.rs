//! Support code for the `docx` binary: inspect transforms and local resource capabilities.

pub mod assets;
pub mod transforms;
