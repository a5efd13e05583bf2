//! Markdown format tests
//!
//! Export of transformed pages and reading the export back.

mod round_trip;
