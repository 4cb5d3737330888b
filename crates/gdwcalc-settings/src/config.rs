//! Configuration and settings management for GDWCalc
//!
//! A job configuration describes one GDW calculation: the wafer and die, an
//! optional fixed centering, an optional forced first-die coordinate, and
//! where and how to write the OWT mask file. Stored as JSON or TOML, chosen
//! by file extension.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use gdwcalc_core::{CenteringConvention, WaferGeometry};
use gdwcalc_wafer::{LineEnding, MaskFileOptions, OriginPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config dir
pub const APP_DIR: &str = "gdwcalc";

/// Default config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Wafer and die dimensions, all in mm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaferSettings {
    pub die_x: f64,
    pub die_y: f64,
    pub diameter: f64,
    pub edge_exclusion: f64,
    pub flat_exclusion: f64,
    /// Y coordinate above which die are lost to the scribe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scribe_limit: Option<f64>,
}

impl Default for WaferSettings {
    fn default() -> Self {
        Self {
            die_x: 5.0,
            die_y: 5.0,
            diameter: 150.0,
            edge_exclusion: 5.0,
            flat_exclusion: 5.0,
            scribe_limit: None,
        }
    }
}

/// X/Y pair in mm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetXY {
    pub x: f64,
    pub y: f64,
}

/// Grid centering. Without a fixed offset the best odd/even centering is
/// searched for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CenteringSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_offset: Option<OffsetXY>,
}

/// Grid coordinate, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

/// Forced coordinate for the topmost-leftmost probed die
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_die: Option<GridCoord>,
}

/// OWT mask file output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskSettings {
    /// Mask name, also the file stem
    pub name: String,
    /// Directory the `.ini` file is written to
    pub output_directory: PathBuf,
    #[serde(default)]
    pub origin: OriginPolicy,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            name: "MDH00".to_string(),
            output_directory: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            origin: OriginPolicy::default(),
            line_ending: LineEnding::default(),
        }
    }
}

/// Complete job configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wafer: WaferSettings,
    #[serde(default)]
    pub centering: CenteringSettings,
    #[serde(default)]
    pub anchor: AnchorSettings,
    #[serde(default)]
    pub mask: MaskSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<platform config dir>/gdwcalc/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.geometry()?;
        self.convention()?;

        if let Some(coord) = self.anchor.first_die {
            if coord.col < 1 || coord.row < 1 {
                return Err(ConfigError::ValueOutOfRange {
                    key: "anchor.first_die".to_string(),
                    value: format!("({}, {})", coord.col, coord.row),
                }
                .into());
            }
        }

        if self.mask.name.trim().is_empty() {
            return Err(ConfigError::ValueOutOfRange {
                key: "mask.name".to_string(),
                value: String::new(),
            }
            .into());
        }

        Ok(())
    }

    /// Validated wafer geometry
    pub fn geometry(&self) -> SettingsResult<WaferGeometry> {
        let w = &self.wafer;
        let geometry = WaferGeometry::new(
            (w.die_x, w.die_y),
            w.diameter,
            w.edge_exclusion,
            w.flat_exclusion,
        )?
        .with_scribe_limit(w.scribe_limit)?;
        Ok(geometry)
    }

    /// The fixed centering, or `None` to search the canonical ones
    pub fn convention(&self) -> SettingsResult<Option<CenteringConvention>> {
        self.centering
            .fixed_offset
            .map(|o| CenteringConvention::fixed(o.x, o.y))
            .transpose()
            .map_err(SettingsError::from)
    }

    /// Mask header options for this wafer
    pub fn mask_options(&self) -> MaskFileOptions {
        MaskFileOptions::new(
            self.mask.name.clone(),
            (self.wafer.die_x, self.wafer.die_y),
            self.wafer.diameter,
        )
        .with_origin(self.mask.origin)
        .with_line_ending(self.mask.line_ending)
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )
            .into()),
        }
    }
}
