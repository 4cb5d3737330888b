//! Die-grid centering conventions
//!
//! "Odd" places a die center on the wafer center, "even" puts a grid line
//! there instead (half a die pitch shift). A fixed offset shifts the grid by
//! an arbitrary distance in mm.

use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Centering rule for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenteringMode {
    /// A die is centered on the wafer center
    Odd,
    /// The grid is shifted by half a die pitch
    Even,
    /// The grid is shifted by this many mm
    Fixed(f64),
}

impl CenteringMode {
    /// Build a fixed-offset mode, rejecting NaN and infinities.
    pub fn fixed(offset_mm: f64) -> Result<Self, ParameterError> {
        if offset_mm.is_finite() {
            Ok(Self::Fixed(offset_mm))
        } else {
            Err(ParameterError::InvalidCentering {
                value: offset_mm.to_string(),
            })
        }
    }

    /// Shift of the grid center in die-pitch units for a die of size `die_dim`.
    pub fn grid_offset(&self, die_dim: f64) -> f64 {
        match self {
            Self::Odd => 0.0,
            Self::Even => 0.5,
            Self::Fixed(mm) => mm / die_dim,
        }
    }
}

impl fmt::Display for CenteringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "odd"),
            Self::Even => write!(f, "even"),
            Self::Fixed(mm) => write!(f, "{}mm", mm),
        }
    }
}

impl FromStr for CenteringMode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "odd" => Ok(Self::Odd),
            "even" => Ok(Self::Even),
            other => {
                let value = other.trim_end_matches("mm").trim();
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Self::Fixed)
                    .ok_or_else(|| ParameterError::InvalidCentering {
                        value: trimmed.to_string(),
                    })
            }
        }
    }
}

/// Centering rule for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenteringConvention {
    pub x: CenteringMode,
    pub y: CenteringMode,
}

impl CenteringConvention {
    /// The four parity conventions, in the order the optimizer tries them.
    pub const CANONICAL: [CenteringConvention; 4] = [
        Self::new(CenteringMode::Odd, CenteringMode::Odd),
        Self::new(CenteringMode::Odd, CenteringMode::Even),
        Self::new(CenteringMode::Even, CenteringMode::Odd),
        Self::new(CenteringMode::Even, CenteringMode::Even),
    ];

    pub const fn new(x: CenteringMode, y: CenteringMode) -> Self {
        Self { x, y }
    }

    /// Fixed offsets in mm for both axes.
    pub fn fixed(x_mm: f64, y_mm: f64) -> Result<Self, ParameterError> {
        Ok(Self::new(CenteringMode::fixed(x_mm)?, CenteringMode::fixed(y_mm)?))
    }

    /// Grid-center shift in die-pitch units. Each axis is divided by its own
    /// die dimension.
    pub fn grid_offset(&self, die_size: (f64, f64)) -> (f64, f64) {
        (self.x.grid_offset(die_size.0), self.y.grid_offset(die_size.1))
    }
}

impl Default for CenteringConvention {
    fn default() -> Self {
        Self::new(CenteringMode::Odd, CenteringMode::Odd)
    }
}

impl fmt::Display for CenteringConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {}, Y: {}", self.x, self.y)
    }
}

impl FromStr for CenteringConvention {
    type Err = ParameterError;

    /// Parse `"<x>,<y>"`, e.g. `"even,odd"` or `"0.25,-1.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(x), Some(y), None) => Ok(Self::new(x.parse()?, y.parse()?)),
            _ => Err(ParameterError::InvalidCentering {
                value: s.to_string(),
            }),
        }
    }
}

/// Parity of a grid center along one axis, as reported back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    /// A whole-number grid center is odd, anything else is reported as even.
    pub fn of_grid_center(value: f64) -> Self {
        if value.rem_euclid(1.0) == 0.0 {
            Self::Odd
        } else {
            Self::Even
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "0 (odd)"),
            Self::Even => write!(f, "0.5 (even)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("odd".parse::<CenteringMode>().unwrap(), CenteringMode::Odd);
        assert_eq!(" EVEN ".parse::<CenteringMode>().unwrap(), CenteringMode::Even);
        assert_eq!(
            "1.25".parse::<CenteringMode>().unwrap(),
            CenteringMode::Fixed(1.25)
        );
        assert_eq!(
            "-0.5mm".parse::<CenteringMode>().unwrap(),
            CenteringMode::Fixed(-0.5)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "middle".parse::<CenteringMode>(),
            Err(ParameterError::InvalidCentering { .. })
        ));
        assert!("NaN".parse::<CenteringMode>().is_err());
        assert!("inf".parse::<CenteringMode>().is_err());
        assert!(CenteringMode::fixed(f64::NAN).is_err());
        assert!("odd".parse::<CenteringConvention>().is_err());
        assert!("odd,odd,odd".parse::<CenteringConvention>().is_err());
    }

    #[test]
    fn test_parse_convention() {
        let conv: CenteringConvention = "even,odd".parse().unwrap();
        assert_eq!(conv, CenteringConvention::CANONICAL[2]);
        assert_eq!(conv.to_string(), "X: even, Y: odd");
    }

    #[test]
    fn test_grid_offset_uses_matching_axis() {
        let conv = CenteringConvention::fixed(1.0, 3.0).unwrap();
        assert_eq!(conv.grid_offset((2.0, 4.0)), (0.5, 0.75));

        let conv = CenteringConvention::new(CenteringMode::Even, CenteringMode::Odd);
        assert_eq!(conv.grid_offset((2.43, 3.30)), (0.5, 0.0));
    }

    #[test]
    fn test_parity_of_grid_center() {
        assert_eq!(Parity::of_grid_center(30.0), Parity::Odd);
        assert_eq!(Parity::of_grid_center(30.5), Parity::Even);
        assert_eq!(Parity::of_grid_center(-2.0), Parity::Odd);
        assert_eq!(Parity::Even.to_string(), "0.5 (even)");
    }
}
