//! Data models for wafers, die, and grid centering

pub mod centering;
pub mod die;
pub mod geometry;

pub use centering::{CenteringConvention, CenteringMode, Parity};
pub use die::{DieStatus, GridPoint, StatusCounts};
pub use geometry::{
    exclusion_radius_sq, flat_length, flat_location, max_dist_sq, WaferGeometry, FLAT_LENGTHS,
};
