//! Classified die positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one grid cell.
///
/// Variants are listed in the order the classifier tests them; the first
/// match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieStatus {
    /// Partly or fully off the wafer. Never emitted as a grid point.
    #[serde(rename = "wafer")]
    Wafer,
    /// Overlaps the region cut away by the flat
    #[serde(rename = "flat")]
    Flat,
    /// Overlaps the edge-exclusion ring
    #[serde(rename = "excl")]
    Excl,
    /// Overlaps the band above the flat
    #[serde(rename = "flatExcl")]
    FlatExcl,
    /// Rises above the scribe limit
    #[serde(rename = "scribe")]
    Scribe,
    /// Fully usable
    #[serde(rename = "probe")]
    Probe,
}

impl DieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wafer => "wafer",
            Self::Flat => "flat",
            Self::Excl => "excl",
            Self::FlatExcl => "flatExcl",
            Self::Scribe => "scribe",
            Self::Probe => "probe",
        }
    }

    /// Still fully on the wafer but lost to one of the exclusion zones.
    pub fn is_edge(&self) -> bool {
        matches!(self, Self::Excl | Self::FlatExcl)
    }
}

impl fmt::Display for DieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified cell of the candidate grid.
///
/// `col`/`row` are 1-based grid indices (rows grow downward); `x`/`y` is the
/// die's lower-left corner in mm relative to the wafer center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub col: i32,
    pub row: i32,
    pub x: f64,
    pub y: f64,
    pub status: DieStatus,
}

impl GridPoint {
    pub fn new(col: i32, row: i32, x: f64, y: f64, status: DieStatus) -> Self {
        Self {
            col,
            row,
            x,
            y,
            status,
        }
    }

    /// `(row, col)` pair, the order the mask tool addresses cells in.
    pub fn rc(&self) -> (i32, i32) {
        (self.row, self.col)
    }
}

/// Die counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub probe: usize,
    pub flat: usize,
    pub excl: usize,
    pub flat_excl: usize,
    pub scribe: usize,
    pub wafer: usize,
}

impl StatusCounts {
    /// Tally the statuses of `points`. `wafer` is left at zero since those
    /// cells are never emitted; see [`StatusCounts::with_total`].
    pub fn tally<'a>(points: impl IntoIterator<Item = &'a GridPoint>) -> Self {
        let mut counts = Self::default();
        for point in points {
            counts.add(point.status);
        }
        counts
    }

    /// Fill in the off-wafer count from the total number of candidate cells.
    pub fn with_total(mut self, total_cells: usize) -> Self {
        self.wafer = total_cells.saturating_sub(self.on_wafer());
        self
    }

    pub fn add(&mut self, status: DieStatus) {
        match status {
            DieStatus::Probe => self.probe += 1,
            DieStatus::Flat => self.flat += 1,
            DieStatus::Excl => self.excl += 1,
            DieStatus::FlatExcl => self.flat_excl += 1,
            DieStatus::Scribe => self.scribe += 1,
            DieStatus::Wafer => self.wafer += 1,
        }
    }

    pub fn get(&self, status: DieStatus) -> usize {
        match status {
            DieStatus::Probe => self.probe,
            DieStatus::Flat => self.flat,
            DieStatus::Excl => self.excl,
            DieStatus::FlatExcl => self.flat_excl,
            DieStatus::Scribe => self.scribe,
            DieStatus::Wafer => self.wafer,
        }
    }

    /// Die that are fully on the wafer, whatever their status.
    pub fn on_wafer(&self) -> usize {
        self.probe + self.flat + self.excl + self.flat_excl + self.scribe
    }

    pub fn total(&self) -> usize {
        self.on_wafer() + self.wafer
    }
}
