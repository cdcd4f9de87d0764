use crate::common::CompilerConfig;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// jmmc - register-allocating Jasmin backend for Java-- IR
#[derive(Debug, Parser)]
#[command(name = "jmmc", version, about, long_about = None)]
pub struct Args {
    /// Path to the IR file.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Fold constants and propagate them within straight-line code.
    #[arg(short = 'o', long)]
    pub optimize: bool,

    /// Also propagate locals assigned once with a literal across the whole method.
    #[arg(long)]
    pub extra: bool,

    /// Register budget: 0 allocates without a limit, a negative value keeps the input slots.
    #[arg(
        short = 'r',
        long,
        value_name = "N",
        allow_negative_numbers = true
    )]
    pub register_allocation: Option<i32>,

    /// Write the Jasmin text to this file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the liveness sets of every method.
    #[arg(long)]
    pub liveness: bool,

    /// Print the final variable table of every method.
    #[arg(long)]
    pub var_tables: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn config(&self) -> CompilerConfig {
        CompilerConfig {
            optimize: self.optimize,
            register_allocation: self.register_allocation,
            extra: self.extra,
        }
    }
}

/// Read the source file from the given path
pub fn read_source_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| {
        format!(
            "Error reading file '{}': {}\n\nUsage: jmmc <FILE> [--optimize] [--register-allocation N]",
            path.display(),
            e
        )
    })
}
