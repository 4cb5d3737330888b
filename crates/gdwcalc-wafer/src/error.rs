//! Error types for the wafer crate.
//!
//! The classifier and optimizer are total over a validated geometry; only
//! mask file generation can fail.

use std::io;
use thiserror::Error;

/// Errors that can occur while building or writing an OWT mask file.
#[derive(Error, Debug)]
pub enum MaskFileError {
    /// A placed die fell outside the mask grid. The die list and the grid
    /// extent disagree, so any file written from them would be corrupt.
    #[error("Data consistency error: cell ({row}, {col}) missing from the {list} list")]
    DataConsistency {
        list: &'static str,
        row: i32,
        col: i32,
    },

    /// There is no probed die to land on.
    #[error("No probed die in the die list")]
    NoProbedDie,

    /// The origin is derived from the edge-exclusion die, and there are none.
    #[error("Cannot derive mask origin: no edge-exclusion die in the die list")]
    NoEdgeDie,

    /// The mask name cannot be used as a quoted value or file name.
    #[error("Invalid mask name: {0:?}")]
    InvalidName(String),

    /// I/O error while writing the file.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for mask file operations.
pub type MaskFileResult<T> = Result<T, MaskFileError>;
