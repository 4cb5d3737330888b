//! Wafer geometry model
//!
//! Holds the per-run wafer and die parameters and derives the constants the
//! classifier compares against: the flat cutoff line and the squared radius
//! of the inner edge-exclusion boundary.

use crate::error::{ParameterError, Result, MAX_DIE_PER_DIAMETER};
use serde::Serialize;

/// Primary flat lengths in mm, keyed by nominal wafer diameter in mm (SEMI M1).
pub const FLAT_LENGTHS: [(u32, f64); 5] = [
    (50, 15.88),
    (75, 22.22),
    (100, 32.5),
    (125, 42.5),
    (150, 57.5),
];

/// Look up the standard flat length for a diameter, if it has one.
pub fn flat_length(diameter: f64) -> Option<f64> {
    FLAT_LENGTHS
        .iter()
        .find(|(dia, _)| f64::from(*dia) == diameter)
        .map(|(_, length)| *length)
}

/// Y location of the wafer flat relative to the wafer center.
///
/// Diameters without a standard flat are notch wafers: the cutoff sits at the
/// bottom of the circle (`-diameter / 2`) and rejects nothing.
pub fn flat_location(diameter: f64) -> Result<f64> {
    ParameterError::check_finite("diameter", diameter)?;
    let radius = diameter / 2.0;
    Ok(match flat_length(diameter) {
        Some(length) => -(radius.powi(2) - (length * 0.5).powi(2)).sqrt(),
        None => -radius,
    })
}

/// Squared distance from the wafer center to the inner edge-exclusion boundary.
///
/// Expands `(r - e)^2` so no square root is needed.
pub fn exclusion_radius_sq(diameter: f64, edge_exclusion: f64) -> f64 {
    (diameter / 2.0).powi(2) + edge_exclusion.powi(2) - diameter * edge_exclusion
}

/// Squared distance from the origin to the farthest corner of a rectangle.
///
/// The farthest corner is the one extending away from the origin in both
/// axes, so its sign follows the quadrant of the rectangle's center.
pub fn max_dist_sq(center: (f64, f64), size: (f64, f64)) -> f64 {
    let mut half_x = size.0 / 2.0;
    let mut half_y = size.1 / 2.0;
    if center.0 < 0.0 {
        half_x = -half_x;
    }
    if center.1 < 0.0 {
        half_y = -half_y;
    }
    (center.0 + half_x).powi(2) + (center.1 + half_y).powi(2)
}

/// Validated wafer and die parameters plus their derived constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaferGeometry {
    die_x: f64,
    die_y: f64,
    diameter: f64,
    edge_exclusion: f64,
    flat_exclusion: f64,
    scribe_limit: Option<f64>,
    flat_y: f64,
    exclusion_radius_sq: f64,
    #[serde(skip)]
    grid_extent: (i32, i32),
}

impl WaferGeometry {
    /// Validate the inputs and derive the flat and exclusion constants.
    pub fn new(
        die_size: (f64, f64),
        diameter: f64,
        edge_exclusion: f64,
        flat_exclusion: f64,
    ) -> Result<Self> {
        let die_x = ParameterError::check_positive("die_x", die_size.0)?;
        let die_y = ParameterError::check_positive("die_y", die_size.1)?;
        let diameter = ParameterError::check_positive("diameter", diameter)?;
        let edge_exclusion = ParameterError::check_non_negative("edge_exclusion", edge_exclusion)?;
        let flat_exclusion = ParameterError::check_non_negative("flat_exclusion", flat_exclusion)?;

        Ok(Self {
            die_x,
            die_y,
            diameter,
            edge_exclusion,
            flat_exclusion,
            scribe_limit: None,
            flat_y: flat_location(diameter)?,
            exclusion_radius_sq: exclusion_radius_sq(diameter, edge_exclusion),
            grid_extent: (
                grid_span("x", diameter, die_x)?,
                grid_span("y", diameter, die_y)?,
            ),
        })
    }

    /// Reject die whose top edge rises above `limit` (mm, wafer-center relative).
    pub fn with_scribe_limit(mut self, limit: Option<f64>) -> Result<Self> {
        if let Some(y) = limit {
            ParameterError::check_finite("scribe_limit", y)?;
        }
        self.scribe_limit = limit;
        Ok(self)
    }

    pub fn die_size(&self) -> (f64, f64) {
        (self.die_x, self.die_y)
    }

    pub fn die_x(&self) -> f64 {
        self.die_x
    }

    pub fn die_y(&self) -> f64 {
        self.die_y
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    pub fn edge_exclusion(&self) -> f64 {
        self.edge_exclusion
    }

    pub fn flat_exclusion(&self) -> f64 {
        self.flat_exclusion
    }

    pub fn scribe_limit(&self) -> Option<f64> {
        self.scribe_limit
    }

    /// Y coordinate of the flat cutoff. Always `>= -radius`.
    pub fn flat_y(&self) -> f64 {
        self.flat_y
    }

    pub fn exclusion_radius_sq(&self) -> f64 {
        self.exclusion_radius_sq
    }

    /// Columns and rows of the candidate grid: twice the die count across the
    /// diameter, so any centering shift still covers the whole wafer.
    pub fn grid_extent(&self) -> (i32, i32) {
        self.grid_extent
    }
}

/// `2 * ceil(diameter / die)`, bounded by [`MAX_DIE_PER_DIAMETER`].
fn grid_span(axis: &str, diameter: f64, die: f64) -> Result<i32> {
    let per_diameter = (diameter / die).ceil();
    let too_large = || ParameterError::GridTooLarge {
        axis: axis.to_string(),
        die_per_diameter: per_diameter,
        max: MAX_DIE_PER_DIAMETER,
    };
    if per_diameter > f64::from(MAX_DIE_PER_DIAMETER) {
        return Err(too_large());
    }
    (per_diameter as i32).checked_mul(2).ok_or_else(too_large)
}
