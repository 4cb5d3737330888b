//! Error handling for GDWCalc
//!
//! The core only fails on bad input: geometry or centering values rejected
//! before any classification starts.

use thiserror::Error;

/// Largest supported `diameter / die` ratio per axis. The candidate grid is
/// twice this wide, so at the limit one classification visits 16 million cells.
pub const MAX_DIE_PER_DIAMETER: u32 = 2000;

/// Parameter validation error type
///
/// Raised at the boundary, before any classification starts. The classifier
/// never sees a geometry that failed one of these checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A value that must be strictly positive was zero or negative
    #[error("Parameter '{name}' must be > 0, got {value}")]
    NotPositive {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// A value that must be non-negative was negative
    #[error("Parameter '{name}' must be >= 0, got {value}")]
    Negative {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// A value was NaN or infinite
    #[error("Parameter '{name}' must be a finite number")]
    NotFinite {
        /// The parameter name.
        name: String,
    },

    /// The die is so small the candidate grid would be unbounded
    #[error("Die {axis} is too small for the wafer: {die_per_diameter} die across the diameter, at most {max} supported")]
    GridTooLarge {
        /// `x` or `y`.
        axis: String,
        /// Diameter divided by the die dimension.
        die_per_diameter: f64,
        /// The supported maximum.
        max: u32,
    },

    /// A centering value was neither `odd`, `even`, nor a finite number
    #[error("Invalid centering value '{value}': expected 'odd', 'even' or a finite offset in mm")]
    InvalidCentering {
        /// The rejected input.
        value: String,
    },
}

impl ParameterError {
    /// Require `value` to be finite and strictly positive
    pub fn check_positive(name: &str, value: f64) -> std::result::Result<f64, Self> {
        Self::check_finite(name, value)?;
        if value <= 0.0 {
            return Err(Self::NotPositive {
                name: name.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Require `value` to be finite and non-negative
    pub fn check_non_negative(name: &str, value: f64) -> std::result::Result<f64, Self> {
        Self::check_finite(name, value)?;
        if value < 0.0 {
            return Err(Self::Negative {
                name: name.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Require `value` to be finite
    pub fn check_finite(name: &str, value: f64) -> std::result::Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NotFinite {
                name: name.to_string(),
            })
        }
    }
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, ParameterError>;
