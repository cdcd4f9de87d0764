//! Command line interface

pub mod args;
pub mod display;

pub use args::{Args, read_source_file};
pub use display::format_reports;
