//! # GDWCalc
//!
//! Gross Die per Wafer calculator: how many rectangular die fit on a round
//! wafer once die off the edge, off the flat, and inside the exclusion zones
//! are removed.
//!
//! ## Architecture
//!
//! GDWCalc is organized as a workspace with multiple crates:
//!
//! 1. **gdwcalc-core** - Wafer geometry, die states, centering conventions, errors
//! 2. **gdwcalc-wafer** - Die classifier, centering optimizer, radius statistics, OWT mask export
//! 3. **gdwcalc-settings** - Job configuration files
//! 4. **gdwcalc** - Main binary that integrates all crates

pub use gdwcalc_core::{
    CenteringConvention, CenteringMode, DieStatus, GridPoint, Parity, ParameterError,
    Result, StatusCounts, WaferGeometry,
};

pub use gdwcalc_wafer::{
    die_radii, CenteringOptimizer, ClassificationResult, DieClassifier, LineEnding, MaskFile,
    MaskFileError, MaskFileOptions, OriginPolicy, RadiusHistogram, SearchResult,
};

pub use gdwcalc_settings::{Config, SettingsError};

use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Everything one calculation produces.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    /// The placement that was kept (anchored if a first die was forced)
    pub result: ClassificationResult,
    pub counts: StatusCounts,
    /// Present when the centering was searched rather than fixed
    pub search: Option<SearchResult>,
    pub radius_linear: RadiusHistogram,
    pub radius_equal_area: RadiusHistogram,
}

/// Run the calculation described by `config`.
pub fn run_job(config: &Config) -> anyhow::Result<JobOutcome> {
    let geometry = config.geometry()?;
    let die_size = geometry.die_size();
    let radius = geometry.radius();

    let (mut result, search) = match config.convention()? {
        Some(convention) => {
            info!(%convention, "Using fixed centering");
            (DieClassifier::new(geometry).classify(convention), None)
        }
        None => {
            let search = CenteringOptimizer::new(geometry).search();
            (search.best.clone(), Some(search))
        }
    };

    if let Some(first) = config.anchor.first_die {
        result = result
            .anchored_at(first.col, first.row)
            .ok_or_else(|| anyhow::anyhow!("cannot force the first die: no die can be probed"))?;
        info!(col = first.col, row = first.row, "Forced first die coordinate");
    }

    let counts = result.counts();
    let (x_parity, y_parity) = result.center_parity();
    info!(
        gdw = counts.probe,
        center_x = result.grid_center.0,
        center_y = result.grid_center.1,
        x_offset = %x_parity,
        y_offset = %y_parity,
        "Placement"
    );

    let radii = die_radii(&result, die_size);
    Ok(JobOutcome {
        radius_linear: RadiusHistogram::linear(&radii),
        radius_equal_area: RadiusHistogram::equal_area(&radii, radius),
        result,
        counts,
        search,
    })
}

/// Build the OWT mask file for `outcome` and write it into
/// `[mask] output_directory`.
pub fn write_mask(config: &Config, outcome: &JobOutcome) -> anyhow::Result<PathBuf> {
    let mask = MaskFile::build(&outcome.result.grid_points, config.mask_options())
        .context("building mask file")?;
    let path = mask
        .write_to(&config.mask.output_directory)
        .context("writing mask file")?;
    info!(path = %path.display(), "Mask file written");
    Ok(path)
}
