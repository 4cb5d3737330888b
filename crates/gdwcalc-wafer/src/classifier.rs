//! # Die Classifier
//!
//! Lays a candidate die grid over the wafer for one centering convention and
//! classifies every cell.
//!
//! The grid is twice as wide and tall (in die) as the wafer diameter so that
//! any centering shift still covers the whole wafer. Cells are visited column
//! by column, rows inner, and that order is kept in the output.
//!
//! All radial comparisons use squared distances and strict `>` / `<`, so a
//! die sitting exactly on a boundary gets the better status.

use gdwcalc_core::{
    max_dist_sq, CenteringConvention, DieStatus, GridPoint, Parity, StatusCounts, WaferGeometry,
};
use serde::{Deserialize, Serialize};

/// Output of one classification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Every on-wafer cell, column-major scan order
    pub grid_points: Vec<GridPoint>,
    /// Wafer center in grid-index units
    pub grid_center: (f64, f64),
    /// Convention the grid was laid out with
    pub convention: CenteringConvention,
    /// Number of candidate cells examined, on wafer or not
    pub total_cells: usize,
}

impl ClassificationResult {
    /// Per-status counts, including the cells dropped as off-wafer.
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.grid_points).with_total(self.total_cells)
    }

    pub fn probe_count(&self) -> usize {
        self.grid_points
            .iter()
            .filter(|p| p.status == DieStatus::Probe)
            .count()
    }

    /// Whether the wafer center falls on a die center (odd) or between die
    /// (even), per axis.
    pub fn center_parity(&self) -> (Parity, Parity) {
        (
            Parity::of_grid_center(self.grid_center.0),
            Parity::of_grid_center(self.grid_center.1),
        )
    }

    /// Topmost probed die, leftmost among ties.
    pub fn first_probe(&self) -> Option<&GridPoint> {
        self.grid_points
            .iter()
            .filter(|p| p.status == DieStatus::Probe)
            .min_by_key(|p| (p.row, p.col))
    }

    /// Shift the grid so the first probed die lands on `(col, row)`.
    ///
    /// Physical coordinates are untouched; the grid center moves with the
    /// indices so grid and mm coordinates still agree. Returns `None` when
    /// nothing was probed.
    pub fn anchored_at(&self, col: i32, row: i32) -> Option<Self> {
        let first = self.first_probe()?;
        let delta_col = first.col - col;
        let delta_row = first.row - row;

        let grid_points = self
            .grid_points
            .iter()
            .map(|p| GridPoint {
                col: p.col - delta_col,
                row: p.row - delta_row,
                ..*p
            })
            .collect();

        Some(Self {
            grid_points,
            grid_center: (
                self.grid_center.0 - f64::from(delta_col),
                self.grid_center.1 - f64::from(delta_row),
            ),
            convention: self.convention,
            total_cells: self.total_cells,
        })
    }
}

/// Classifies die positions on one wafer.
#[derive(Debug, Clone)]
pub struct DieClassifier {
    geometry: WaferGeometry,
}

impl DieClassifier {
    pub fn new(geometry: WaferGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &WaferGeometry {
        &self.geometry
    }

    /// Lay out the grid for `convention` and classify every cell.
    pub fn classify(&self, convention: CenteringConvention) -> ClassificationResult {
        let geo = &self.geometry;
        let (die_x, die_y) = geo.die_size();
        let (grid_max_x, grid_max_y) = geo.grid_extent();
        let (x_offset, y_offset) = convention.grid_offset(geo.die_size());
        let grid_center = (
            f64::from(grid_max_x) / 2.0 + x_offset,
            f64::from(grid_max_y) / 2.0 + y_offset,
        );

        let mut grid_points = Vec::new();
        let mut total_cells = 0;
        for gx in 1..grid_max_x {
            for gy in 1..grid_max_y {
                total_cells += 1;
                let center_x = die_x * (f64::from(gx) - grid_center.0);
                // rows grow downward, physical Y grows upward
                let center_y = die_y * (grid_center.1 - f64::from(gy));

                let status = self.classify_die((center_x, center_y));
                if status == DieStatus::Wafer {
                    continue;
                }
                grid_points.push(GridPoint::new(
                    gx,
                    gy,
                    center_x - die_x / 2.0,
                    center_y - die_y / 2.0,
                    status,
                ));
            }
        }

        ClassificationResult {
            grid_points,
            grid_center,
            convention,
            total_cells,
        }
    }

    /// Status of a die centered at `center` (mm, wafer-center relative).
    pub fn classify_die(&self, center: (f64, f64)) -> DieStatus {
        let geo = &self.geometry;
        let die_y = geo.die_y();
        let die_max_sq = max_dist_sq(center, geo.die_size());
        let lower_left_y = center.1 - die_y / 2.0;

        if die_max_sq > geo.radius().powi(2) {
            DieStatus::Wafer
        } else if lower_left_y < geo.flat_y() {
            DieStatus::Flat
        } else if die_max_sq > geo.exclusion_radius_sq() {
            DieStatus::Excl
        } else if lower_left_y < geo.flat_y() + geo.flat_exclusion() {
            DieStatus::FlatExcl
        } else if geo
            .scribe_limit()
            .is_some_and(|limit| lower_left_y + die_y > limit)
        {
            DieStatus::Scribe
        } else {
            DieStatus::Probe
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdwcalc_core::CenteringMode;

    fn classifier(die: (f64, f64), dia: f64, excl: f64, flat_excl: f64) -> DieClassifier {
        DieClassifier::new(WaferGeometry::new(die, dia, excl, flat_excl).unwrap())
    }

    #[test]
    fn test_grid_center() {
        let c = classifier((5.0, 5.0), 150.0, 5.0, 5.0);
        let odd = c.classify(CenteringConvention::CANONICAL[0]);
        assert_eq!(odd.grid_center, (30.0, 30.0));
        let even = c.classify(CenteringConvention::CANONICAL[3]);
        assert_eq!(even.grid_center, (30.5, 30.5));
        assert_eq!(even.total_cells, 59 * 59);
    }

    #[test]
    fn test_scan_order_is_column_major() {
        let result = classifier((5.0, 5.0), 150.0, 5.0, 5.0)
            .classify(CenteringConvention::CANONICAL[3]);
        for pair in result.grid_points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(a.col < b.col || (a.col == b.col && a.row < b.row));
        }
    }

    #[test]
    fn test_lower_left_coordinates() {
        let result = classifier((5.0, 5.0), 150.0, 5.0, 5.0)
            .classify(CenteringConvention::CANONICAL[0]);
        // odd/odd: die (30, 30) is centered on the wafer
        let center = result
            .grid_points
            .iter()
            .find(|p| p.col == 30 && p.row == 30)
            .unwrap();
        assert_eq!((center.x, center.y), (-2.5, -2.5));
        assert_eq!(center.status, DieStatus::Probe);

        // one row up the grid is one die up the wafer
        let above = result
            .grid_points
            .iter()
            .find(|p| p.col == 30 && p.row == 29)
            .unwrap();
        assert_eq!(above.y, 2.5);
    }

    #[test]
    fn test_corner_on_wafer_edge_is_kept() {
        // even/even puts die corners at (±3, ±4), exactly on the 5mm radius
        let result = classifier((3.0, 4.0), 10.0, 0.0, 0.0)
            .classify(CenteringConvention::CANONICAL[3]);
        assert_eq!(result.grid_points.len(), 4);
        assert!(result
            .grid_points
            .iter()
            .all(|p| p.status == DieStatus::Probe));
    }

    #[test]
    fn test_classification_precedence() {
        let c = classifier((5.0, 5.0), 150.0, 5.0, 5.0);
        let flat_y = c.geometry().flat_y();

        assert_eq!(c.classify_die((0.0, 0.0)), DieStatus::Probe);
        assert_eq!(c.classify_die((80.0, 0.0)), DieStatus::Wafer);
        // below the flat and inside the exclusion ring: flat wins
        assert_eq!(c.classify_die((0.0, flat_y + 1.0)), DieStatus::Flat);
        assert_eq!(c.classify_die((70.0, 0.0)), DieStatus::Excl);
        assert_eq!(c.classify_die((0.0, flat_y + 5.0)), DieStatus::FlatExcl);
    }

    #[test]
    fn test_scribe_limit() {
        let geo = WaferGeometry::new((5.0, 5.0), 150.0, 5.0, 5.0)
            .unwrap()
            .with_scribe_limit(Some(50.0))
            .unwrap();
        let c = DieClassifier::new(geo);
        assert_eq!(c.classify_die((0.0, 47.5)), DieStatus::Probe);
        assert_eq!(c.classify_die((0.0, 48.0)), DieStatus::Scribe);

        let result = c.classify(CenteringConvention::CANONICAL[0]);
        let counts = result.counts();
        assert!(counts.scribe > 0);
        assert_eq!(counts.total(), result.total_cells);
        assert!(result
            .grid_points
            .iter()
            .filter(|p| p.status == DieStatus::Scribe)
            .all(|p| p.y + 5.0 > 50.0));
    }

    #[test]
    fn test_fixed_offset_matches_even() {
        let c = classifier((2.43, 3.30), 150.0, 5.0, 4.5);
        let even = c.classify(CenteringConvention::new(
            CenteringMode::Even,
            CenteringMode::Odd,
        ));
        let fixed = c.classify(CenteringConvention::new(
            CenteringMode::Fixed(1.215),
            CenteringMode::Fixed(0.0),
        ));
        assert_eq!(even.probe_count(), fixed.probe_count());
    }

    #[test]
    fn test_anchor_first_probe() {
        let result = classifier((5.0, 5.0), 150.0, 5.0, 5.0)
            .classify(CenteringConvention::CANONICAL[3]);
        let first = *result.first_probe().unwrap();

        let anchored = result.anchored_at(1, 1).unwrap();
        let moved = anchored.first_probe().unwrap();
        assert_eq!((moved.col, moved.row), (1, 1));
        assert_eq!((moved.x, moved.y), (first.x, first.y));
        assert_eq!(
            anchored.grid_center.0 - result.grid_center.0,
            f64::from(1 - first.col)
        );
        assert_eq!(anchored.counts(), result.counts());
    }

    #[test]
    fn test_anchor_without_probe() {
        let result = ClassificationResult {
            grid_points: vec![GridPoint::new(1, 1, 0.0, 0.0, DieStatus::Excl)],
            grid_center: (1.0, 1.0),
            convention: CenteringConvention::default(),
            total_cells: 1,
        };
        assert!(result.anchored_at(1, 1).is_none());
    }
}
