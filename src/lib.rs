//! jmmc: the backend of a Java-- compiler
//!
//! Reads a class in the textual Java-- IR, optionally optimises it,
//! computes liveness, colors locals onto JVM slots and writes Jasmin.

pub mod backend;
pub mod cli;
pub mod common;
pub mod frontend;
pub mod pipeline;
