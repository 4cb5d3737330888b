//! # OWT Mask File Exporter
//!
//! Converts a classified die list into the INI-style mask description read
//! by the OWT prober software.
//!
//! The three coordinate lists in the file are exclusion lists. Each starts
//! as the full `Rows × Cols` grid and has the die it applies to removed:
//!
//! - `TestAll` drops the probed die
//! - `Every` drops the probed and edge-exclusion die
//! - `Edge Inking` drops the edge-exclusion die (`excl` and `flatExcl`)
//!
//! Removing a cell that is not in the grid means the die list and the grid
//! extent disagree; that is reported as [`MaskFileError::DataConsistency`].

use crate::error::{MaskFileError, MaskFileResult};
use gdwcalc_core::{DieStatus, GridPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Distance (in die) kept between the outermost edge-exclusion die and
/// row/column 1 when the origin is derived automatically.
pub const EDGE_ORIGIN_MARGIN: i32 = 2;

/// How grid indices are shifted before they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginPolicy {
    /// Subtract (min edge row − 2, min edge col − 2)
    #[default]
    EdgeDerived,
    /// Subtract the given shift
    Fixed { row_shift: i32, col_shift: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// Everything the mask header needs besides the die list.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskFileOptions {
    pub name: String,
    /// Die size in mm
    pub die_size: (f64, f64),
    /// Wafer diameter in mm
    pub diameter: f64,
    pub origin: OriginPolicy,
    pub line_ending: LineEnding,
}

impl MaskFileOptions {
    pub fn new(name: impl Into<String>, die_size: (f64, f64), diameter: f64) -> Self {
        Self {
            name: name.into(),
            die_size,
            diameter,
            origin: OriginPolicy::default(),
            line_ending: LineEnding::default(),
        }
    }

    pub fn with_origin(mut self, origin: OriginPolicy) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}

/// A fully assembled mask file, ready to render or write.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskFile {
    options: MaskFileOptions,
    /// `(row_shift, col_shift)` subtracted from the grid indices
    shift: (i32, i32),
    rows: i32,
    cols: i32,
    start: (i32, i32),
    every: BTreeSet<(i32, i32)>,
    test_all: BTreeSet<(i32, i32)>,
    edge_inking: BTreeSet<(i32, i32)>,
}

impl MaskFile {
    /// Build the mask from every on-wafer die of a classification.
    pub fn build(points: &[GridPoint], options: MaskFileOptions) -> MaskFileResult<Self> {
        validate_name(&options.name)?;

        let shift = match options.origin {
            OriginPolicy::EdgeDerived => edge_origin(points)?,
            OriginPolicy::Fixed {
                row_shift,
                col_shift,
            } => (row_shift, col_shift),
        };
        info!(row_shift = shift.0, col_shift = shift.1, "Mask origin");

        let shifted: Vec<GridPoint> = points
            .iter()
            .map(|p| GridPoint {
                row: p.row - shift.0,
                col: p.col - shift.1,
                ..*p
            })
            .collect();

        let rows = shifted
            .iter()
            .map(|p| p.row)
            .max()
            .ok_or(MaskFileError::NoProbedDie)?
            + 1;
        let cols = shifted.iter().map(|p| p.col).max().unwrap_or(0) + 1;
        info!(rows, cols, "Mask extent");

        let all: BTreeSet<(i32, i32)> = (1..=rows)
            .flat_map(|r| (1..=cols).map(move |c| (r, c)))
            .collect();
        let mut test_all = all.clone();
        let mut every = all.clone();
        let mut edge_inking = all;
        let mut probed = Vec::new();

        for point in &shifted {
            let rc = point.rc();
            if point.status == DieStatus::Probe {
                take(&mut test_all, rc, "TestAll")?;
                probed.push(rc);
            }
            if point.status == DieStatus::Probe || point.status.is_edge() {
                take(&mut every, rc, "Every")?;
            }
            if point.status.is_edge() {
                take(&mut edge_inking, rc, "Edge Inking")?;
            }
        }

        // (row, col) ordering: topmost row first, then leftmost column
        let start = probed
            .into_iter()
            .min()
            .ok_or(MaskFileError::NoProbedDie)?;
        info!(start_row = start.0, start_col = start.1, "Landing die");

        Ok(Self {
            options,
            shift,
            rows,
            cols,
            start,
            every,
            test_all,
            edge_inking,
        })
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// `<name>.ini`
    pub fn file_name(&self) -> String {
        format!("{}.ini", self.options.name)
    }

    pub fn shift(&self) -> (i32, i32) {
        self.shift
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Landing die as `(row, col)`.
    pub fn start(&self) -> (i32, i32) {
        self.start
    }

    pub fn every(&self) -> &BTreeSet<(i32, i32)> {
        &self.every
    }

    pub fn test_all(&self) -> &BTreeSet<(i32, i32)> {
        &self.test_all
    }

    pub fn edge_inking(&self) -> &BTreeSet<(i32, i32)> {
        &self.edge_inking
    }

    /// The file contents.
    pub fn render(&self) -> String {
        let opts = &self.options;
        let lines = [
            "[Mask]".to_string(),
            format!("Mask = \"{}\"", opts.name),
            format!("Die X = {:.6}", opts.die_size.0),
            format!("Die Y = {:.6}", opts.die_size.1),
            "Flat = 0".to_string(),
            String::new(),
            format!("[{}mm]", opts.diameter.trunc() as i64),
            format!("Rows = {}", self.rows),
            format!("Cols = {}", self.cols),
            "Home Row = 1".to_string(),
            "Home Col = 1".to_string(),
            format!("Start Row = {}", self.start.0),
            format!("Start Col = {}", self.start.1),
            format!("Every = \"{}\"", join_rc(&self.every)),
            format!("TestAll = \"{}\"", join_rc(&self.test_all)),
            format!("Edge Inking = \"{}\"", join_rc(&self.edge_inking)),
            String::new(),
            "[Devices]".to_string(),
            "PCM = \"0.2,0,0,,T\"".to_string(),
        ];

        let eol = opts.line_ending.as_str();
        let mut out = lines.join(eol);
        out.push_str(eol);
        out
    }

    /// Write `<dir>/<name>.ini` in one go and return its path.
    pub fn write_to(&self, dir: &Path) -> MaskFileResult<PathBuf> {
        let path = dir.join(self.file_name());
        fs::write(&path, self.render())?;
        info!(path = %path.display(), "Saved mask file");
        Ok(path)
    }
}

fn validate_name(name: &str) -> MaskFileResult<()> {
    let bad = name.trim().is_empty()
        || name
            .chars()
            .any(|c| matches!(c, '"' | '/' | '\\' | '\r' | '\n'));
    if bad {
        return Err(MaskFileError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Shift that puts the outermost edge-exclusion die two cells in from (1, 1).
fn edge_origin(points: &[GridPoint]) -> MaskFileResult<(i32, i32)> {
    let edge = || points.iter().filter(|p| p.status == DieStatus::Excl);
    let min_row = edge().map(|p| p.row).min();
    let min_col = edge().map(|p| p.col).min();
    match (min_row, min_col) {
        (Some(row), Some(col)) => Ok((row - EDGE_ORIGIN_MARGIN, col - EDGE_ORIGIN_MARGIN)),
        _ => {
            tracing::warn!("No edge-exclusion die; cannot derive mask origin");
            Err(MaskFileError::NoEdgeDie)
        }
    }
}

fn take(set: &mut BTreeSet<(i32, i32)>, rc: (i32, i32), list: &'static str) -> MaskFileResult<()> {
    if set.remove(&rc) {
        Ok(())
    } else {
        Err(MaskFileError::DataConsistency {
            list,
            row: rc.0,
            col: rc.1,
        })
    }
}

fn join_rc(cells: &BTreeSet<(i32, i32)>) -> String {
    cells
        .iter()
        .map(|(r, c)| format!("{},{}", r, c))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn die(col: i32, row: i32, status: DieStatus) -> GridPoint {
        GridPoint::new(col, row, 0.0, 0.0, status)
    }

    #[test]
    fn test_fixed_origin_lists() {
        let points = [
            die(1, 1, DieStatus::Excl),
            die(2, 1, DieStatus::Probe),
            die(1, 2, DieStatus::Flat),
            die(2, 2, DieStatus::FlatExcl),
        ];
        let options = MaskFileOptions::new("T1", (1.0, 1.0), 100.0).with_origin(
            OriginPolicy::Fixed {
                row_shift: 0,
                col_shift: 0,
            },
        );
        let mask = MaskFile::build(&points, options).unwrap();
        assert_eq!((mask.rows(), mask.cols()), (3, 3));
        assert_eq!(mask.start(), (1, 2));
        assert!(!mask.test_all().contains(&(1, 2)));
        assert!(mask.test_all().contains(&(1, 1)));
        assert!(!mask.every().contains(&(1, 1)));
        assert!(!mask.every().contains(&(2, 2)));
        // the flat die stays in every list
        assert!(mask.every().contains(&(2, 1)));
        assert!(mask.edge_inking().contains(&(2, 1)));
        assert!(!mask.edge_inking().contains(&(1, 1)));
        assert_eq!(mask.edge_inking().len(), 9 - 2);
    }

    #[test]
    fn test_edge_origin() {
        let points = [
            die(10, 20, DieStatus::Excl),
            die(11, 20, DieStatus::Probe),
            die(10, 21, DieStatus::Excl),
        ];
        assert_eq!(edge_origin(&points).unwrap(), (18, 8));
        assert!(matches!(
            edge_origin(&points[1..2]),
            Err(MaskFileError::NoEdgeDie)
        ));
    }

    #[test]
    fn test_cell_outside_grid_is_fatal() {
        // a shift that pushes a die to row 0 leaves it outside 1..=rows
        let points = [die(3, 1, DieStatus::Probe), die(3, 3, DieStatus::Excl)];
        let options = MaskFileOptions::new("T2", (1.0, 1.0), 100.0).with_origin(
            OriginPolicy::Fixed {
                row_shift: 1,
                col_shift: 0,
            },
        );
        let err = MaskFile::build(&points, options).unwrap_err();
        assert!(matches!(
            err,
            MaskFileError::DataConsistency {
                list: "TestAll",
                row: 0,
                col: 3
            }
        ));
    }

    #[test]
    fn test_invalid_name() {
        let points = [die(3, 3, DieStatus::Excl), die(4, 4, DieStatus::Probe)];
        for name in ["", "a/b", "quo\"te"] {
            let options = MaskFileOptions::new(name, (1.0, 1.0), 100.0);
            assert!(matches!(
                MaskFile::build(&points, options),
                Err(MaskFileError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_no_probed_die() {
        let points = [die(3, 3, DieStatus::Excl)];
        let options = MaskFileOptions::new("T3", (1.0, 1.0), 100.0);
        assert!(matches!(
            MaskFile::build(&points, options),
            Err(MaskFileError::NoProbedDie)
        ));
    }

    #[test]
    fn test_join_rc() {
        let cells: BTreeSet<_> = [(2, 1), (1, 3), (1, 2)].into_iter().collect();
        assert_eq!(join_rc(&cells), "1,2; 1,3; 2,1");
        assert_eq!(join_rc(&BTreeSet::new()), "");
    }

    #[test]
    fn test_crlf_render() {
        let points = [die(3, 3, DieStatus::Excl), die(4, 3, DieStatus::Probe)];
        let options =
            MaskFileOptions::new("T4", (2.5, 3.0), 150.0).with_line_ending(LineEnding::Crlf);
        let text = MaskFile::build(&points, options).unwrap().render();
        assert!(text.starts_with("[Mask]\r\nMask = \"T4\"\r\nDie X = 2.500000\r\n"));
        assert!(text.ends_with("PCM = \"0.2,0,0,,T\"\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }
}
