use anyhow::Context;
use clap::Parser;
use gdwcalc::{init_logging, run_job, write_mask, Config, JobOutcome};
use gdwcalc_settings::{GridCoord, OffsetXY};
use std::path::PathBuf;
use tracing::info;

/// Gross Die per Wafer calculator
#[derive(Parser, Debug)]
#[command(name = "gdwcalc", version, about)]
struct Args {
    /// Job configuration (JSON or TOML); defaults to the user config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Die size in mm
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    die: Option<Vec<f64>>,

    /// Wafer diameter in mm
    #[arg(long)]
    diameter: Option<f64>,

    /// Edge exclusion in mm
    #[arg(long)]
    edge_exclusion: Option<f64>,

    /// Flat exclusion in mm
    #[arg(long)]
    flat_exclusion: Option<f64>,

    /// Use a fixed centering offset (mm) instead of searching
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    fixed_offset: Option<Vec<f64>>,

    /// Die whose top edge is above this Y (mm) are lost to the scribe
    #[arg(long, allow_negative_numbers = true)]
    scribe_limit: Option<f64>,

    /// Force the topmost-leftmost probed die to this grid coordinate
    #[arg(long, num_args = 2, value_names = ["COL", "ROW"])]
    first_die: Option<Vec<i32>>,

    /// Write the OWT mask file into `[mask] output_directory` of the config
    #[arg(long)]
    mask: bool,

    /// Write the OWT mask file into this directory (implies --mask)
    #[arg(long)]
    mask_dir: Option<PathBuf>,

    /// Mask name
    #[arg(long)]
    mask_name: Option<String>,

    /// Write the full result as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Args {
    fn writes_mask(&self) -> bool {
        self.mask || self.mask_dir.is_some()
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::default_path()?,
        };
        let mut config = Config::load_or_default(&path)
            .with_context(|| format!("loading {}", path.display()))?;

        if let Some(&[x, y]) = self.die.as_deref() {
            config.wafer.die_x = x;
            config.wafer.die_y = y;
        }
        if let Some(diameter) = self.diameter {
            config.wafer.diameter = diameter;
        }
        if let Some(edge) = self.edge_exclusion {
            config.wafer.edge_exclusion = edge;
        }
        if let Some(flat) = self.flat_exclusion {
            config.wafer.flat_exclusion = flat;
        }
        if let Some(&[x, y]) = self.fixed_offset.as_deref() {
            config.centering.fixed_offset = Some(OffsetXY { x, y });
        }
        if self.scribe_limit.is_some() {
            config.wafer.scribe_limit = self.scribe_limit;
        }
        if let Some(&[col, row]) = self.first_die.as_deref() {
            config.anchor.first_die = Some(GridCoord { col, row });
        }
        if let Some(dir) = &self.mask_dir {
            config.mask.output_directory = dir.clone();
        }
        if let Some(name) = &self.mask_name {
            config.mask.name = name.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_summary(outcome: &JobOutcome) {
    match &outcome.search {
        Some(search) => println!("{search}"),
        None => println!("GDW: {}", outcome.counts.probe),
    }
    let (x_parity, y_parity) = outcome.result.center_parity();
    println!("Center Offsets: X: {x_parity}, Y: {y_parity}");
    if let Some(first) = outcome.result.first_probe() {
        println!("First Die: col {}, row {}", first.col, first.row);
    }

    println!("Die per ring (linear):");
    for (lo, hi, count) in outcome.radius_linear.bins() {
        println!("  {lo:7.2} - {hi:7.2} mm: {count}");
    }
    println!("Die per ring (equal area):");
    for (lo, hi, count) in outcome.radius_equal_area.bins() {
        println!("  {lo:7.2} - {hi:7.2} mm: {count}");
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args = Args::parse();
    let config = args.load_config()?;
    info!(version = gdwcalc::VERSION, built = gdwcalc::BUILD_DATE, "gdwcalc");

    let outcome = run_job(&config)?;
    print_summary(&outcome);

    if args.writes_mask() {
        let path = write_mask(&config, &outcome)?;
        println!("Mask file: {}", path.display());
    }

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Result written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_switches() {
        let args = Args::try_parse_from(["gdwcalc"]).unwrap();
        assert!(!args.writes_mask());

        let args = Args::try_parse_from(["gdwcalc", "--mask"]).unwrap();
        assert!(args.writes_mask());
        assert!(args.mask_dir.is_none());

        let args = Args::try_parse_from(["gdwcalc", "--mask-dir", "out"]).unwrap();
        assert!(args.writes_mask());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");
        std::fs::write(&path, "[mask]\nname = \"FROMFILE\"\noutput_directory = \"masks\"\n")
            .unwrap();
        let config_arg = path.to_string_lossy().into_owned();

        let args = Args::try_parse_from([
            "gdwcalc",
            "--config",
            config_arg.as_str(),
            "--die",
            "2.43",
            "3.30",
            "--fixed-offset",
            "-1.5",
            "0.5",
            "--mask",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        assert_eq!((config.wafer.die_x, config.wafer.die_y), (2.43, 3.30));
        assert_eq!(
            config.centering.fixed_offset,
            Some(OffsetXY { x: -1.5, y: 0.5 })
        );
        // no --mask-dir: the directory from the file is kept
        assert_eq!(config.mask.name, "FROMFILE");
        assert_eq!(config.mask.output_directory, PathBuf::from("masks"));
    }
}
