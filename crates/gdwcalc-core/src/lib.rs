//! # GDWCalc Core
//!
//! Core types for the Gross Die per Wafer calculator.
//! Provides the wafer geometry model, die classification states,
//! centering conventions, and the shared error types.

pub mod data;
pub mod error;

pub use data::{
    exclusion_radius_sq, flat_length, flat_location, max_dist_sq, CenteringConvention,
    CenteringMode, DieStatus, GridPoint, Parity, StatusCounts, WaferGeometry, FLAT_LENGTHS,
};

pub use error::{ParameterError, Result, MAX_DIE_PER_DIAMETER};
