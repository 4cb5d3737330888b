//! # GDWCalc Wafer Tools
//!
//! Gross Die per Wafer computation and its outputs.
//!
//! ## Tools Included
//!
//! - **Die Classifier**: Lays a die grid over the wafer and classifies every
//!   cell as off-wafer, flat, edge exclusion, flat exclusion, scribe or probe
//! - **Centering Optimizer**: Finds the odd/even grid centering with the most
//!   probed die
//! - **Radius Statistics**: Radial distribution of the placed die
//! - **Mask File Exporter**: Writes the OWT mask description of a placement

pub mod classifier;
pub mod error;
pub mod mask_file;
pub mod optimizer;
pub mod radius;

// Re-export commonly used items
pub use classifier::{ClassificationResult, DieClassifier};
pub use error::{MaskFileError, MaskFileResult};
pub use mask_file::{LineEnding, MaskFile, MaskFileOptions, OriginPolicy};
pub use optimizer::{CandidateScore, CenteringOptimizer, SearchResult};
pub use radius::{die_radii, equal_area_edges, linear_edges, RadiusHistogram};
