//! # Centering Optimizer
//!
//! Runs the classifier under each canonical centering convention and keeps
//! the one with the most probed die. Ties go to the convention tried first.

use crate::classifier::{ClassificationResult, DieClassifier};
use gdwcalc_core::{CenteringConvention, StatusCounts, WaferGeometry};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Probe count reached by one candidate convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub convention: CenteringConvention,
    pub probe: usize,
}

/// Winning classification plus its per-status counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best: ClassificationResult,
    pub counts: StatusCounts,
    /// Every convention tried, in search order
    pub candidates: Vec<CandidateScore>,
}

impl SearchResult {
    pub fn convention(&self) -> CenteringConvention {
        self.best.convention
    }

    /// Gross die per wafer: the probed die count of the winner.
    pub fn gdw(&self) -> usize {
        self.counts.probe
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----------------------------------")?;
        writeln!(
            f,
            "Maximum GDW: {} ({})",
            self.counts.probe, self.best.convention
        )?;
        writeln!(f)?;
        writeln!(f, "Die lost to Edge Exclusion: {}", self.counts.excl)?;
        writeln!(f, "Die Lost to Wafer Flat: {}", self.counts.flat)?;
        writeln!(
            f,
            "Die Lost to Front-Side Scribe Exclusion: {}",
            self.counts.flat_excl
        )?;
        if self.counts.scribe > 0 {
            writeln!(f, "Die Lost to Scribe Limit: {}", self.counts.scribe)?;
        }
        write!(f, "----------------------------------")
    }
}

/// Searches the canonical centering conventions for the highest GDW.
#[derive(Debug, Clone)]
pub struct CenteringOptimizer {
    classifier: DieClassifier,
}

impl CenteringOptimizer {
    pub fn new(geometry: WaferGeometry) -> Self {
        Self {
            classifier: DieClassifier::new(geometry),
        }
    }

    pub fn classifier(&self) -> &DieClassifier {
        &self.classifier
    }

    /// Try (odd, odd), (odd, even), (even, odd), (even, even) in that order.
    pub fn search(&self) -> SearchResult {
        let [first, rest @ ..] = CenteringConvention::CANONICAL;
        let mut result = self.start(first);
        for convention in rest {
            self.consider(&mut result, convention);
        }

        info!(
            gdw = result.counts.probe,
            convention = %result.best.convention,
            lost_edge = result.counts.excl,
            lost_flat = result.counts.flat,
            lost_flat_excl = result.counts.flat_excl,
            lost_scribe = result.counts.scribe,
            "Maximum GDW found"
        );
        result
    }

    /// Search an arbitrary list of conventions. `None` if the list is empty.
    pub fn search_over(&self, conventions: &[CenteringConvention]) -> Option<SearchResult> {
        let (first, rest) = conventions.split_first()?;
        let mut result = self.start(*first);
        for convention in rest {
            self.consider(&mut result, *convention);
        }
        Some(result)
    }

    fn start(&self, convention: CenteringConvention) -> SearchResult {
        let best = self.classifier.classify(convention);
        let counts = best.counts();
        debug!(%convention, probe = counts.probe, "Centering candidate");
        SearchResult {
            candidates: vec![CandidateScore {
                convention,
                probe: counts.probe,
            }],
            best,
            counts,
        }
    }

    fn consider(&self, result: &mut SearchResult, convention: CenteringConvention) {
        let candidate = self.classifier.classify(convention);
        let counts = candidate.counts();
        debug!(%convention, probe = counts.probe, "Centering candidate");
        result.candidates.push(CandidateScore {
            convention,
            probe: counts.probe,
        });
        // strictly greater: an equal count never displaces an earlier winner
        if counts.probe > result.counts.probe {
            result.best = candidate;
            result.counts = counts;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdwcalc_core::CenteringMode;

    #[test]
    fn test_search_tries_all_four_in_order() {
        let geo = WaferGeometry::new((5.0, 5.0), 150.0, 5.0, 5.0).unwrap();
        let result = CenteringOptimizer::new(geo).search();
        let tried: Vec<_> = result.candidates.iter().map(|c| c.convention).collect();
        assert_eq!(tried, CenteringConvention::CANONICAL.to_vec());
        let max = result.candidates.iter().map(|c| c.probe).max().unwrap();
        assert_eq!(result.gdw(), max);
    }

    #[test]
    fn test_tie_keeps_first() {
        // a square die on a notch wafer is symmetric in X and Y, so
        // (odd, even) and (even, odd) always tie
        let geo = WaferGeometry::new((4.0, 4.0), 60.0, 2.0, 0.0).unwrap();
        let optimizer = CenteringOptimizer::new(geo);
        let oe = CenteringConvention::new(CenteringMode::Odd, CenteringMode::Even);
        let eo = CenteringConvention::new(CenteringMode::Even, CenteringMode::Odd);

        let result = optimizer.search_over(&[oe, eo]).unwrap();
        assert_eq!(result.candidates[0].probe, result.candidates[1].probe);
        assert_eq!(result.convention(), oe);

        let result = optimizer.search_over(&[eo, oe]).unwrap();
        assert_eq!(result.convention(), eo);
    }

    #[test]
    fn test_search_over_empty() {
        let geo = WaferGeometry::new((5.0, 5.0), 150.0, 5.0, 5.0).unwrap();
        assert!(CenteringOptimizer::new(geo).search_over(&[]).is_none());
    }

    #[test]
    fn test_summary_display() {
        let geo = WaferGeometry::new((5.0, 5.0), 150.0, 5.0, 5.0).unwrap();
        let result = CenteringOptimizer::new(geo).search();
        let text = result.to_string();
        assert!(text.contains(&format!("Maximum GDW: {}", result.gdw())));
        assert!(text.contains("Die lost to Edge Exclusion:"));
        assert!(!text.contains("Scribe Limit"));
    }
}
