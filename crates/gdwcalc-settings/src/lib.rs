//! GDWCalc Settings Crate
//!
//! Handles job configuration files and their conversion into validated
//! wafer geometry, centering, and mask file options.

pub mod config;
pub mod error;

pub use config::{
    AnchorSettings, CenteringSettings, Config, GridCoord, MaskSettings, OffsetXY, WaferSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
