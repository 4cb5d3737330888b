//! Radial distribution of placed die
//!
//! Distance from each die center to the wafer center, binned either in
//! equal-width rings or in rings of equal area.

use crate::classifier::ClassificationResult;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Ring width used by the default linear histogram (mm)
pub const DEFAULT_RING_WIDTH: f64 = 5.0;

/// Outer edge of the default linear histogram (mm)
pub const DEFAULT_MAX_RADIUS: f64 = 80.0;

/// Area of each ring in the default equal-area histogram (mm²)
pub const DEFAULT_RING_AREA: f64 = 2000.0;

/// Center-to-center radius (mm) of every die in `result`.
pub fn die_radii(result: &ClassificationResult, die_size: (f64, f64)) -> Vec<f64> {
    let (cx, cy) = result.grid_center;
    result
        .grid_points
        .iter()
        .map(|p| {
            let dx = die_size.0 * (cx - f64::from(p.col));
            let dy = die_size.1 * (cy - f64::from(p.row));
            (dx.powi(2) + dy.powi(2)).sqrt()
        })
        .collect()
}

/// Bin edges `0, step, 2·step, ...` up to and including `max`.
pub fn linear_edges(step: f64, max: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || max.is_nan() || max < 0.0 {
        return Vec::new();
    }
    let count = (max / step).floor() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

/// Bin edges such that every ring covers `area` mm², ending at the first
/// edge at or beyond `max_radius` so the whole disc is covered.
pub fn equal_area_edges(area: f64, max_radius: f64) -> Vec<f64> {
    if !area.is_finite() || area <= 0.0 || !max_radius.is_finite() || max_radius < 0.0 {
        return Vec::new();
    }
    let mut edges = vec![0.0];
    let mut k = 1.0;
    loop {
        let edge = (k * area / PI).sqrt();
        edges.push(edge);
        if edge >= max_radius {
            break;
        }
        k += 1.0;
    }
    edges
}

/// Counts of values per bin.
///
/// Bins are half-open `[lo, hi)` except the last, which also takes values
/// equal to its upper edge. Values outside the edges are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl RadiusHistogram {
    /// `edges` must be ascending; fewer than two edges gives an empty histogram.
    pub fn new(values: &[f64], edges: Vec<f64>) -> Self {
        let bins = edges.len().saturating_sub(1);
        let mut counts = vec![0; bins];
        if bins > 0 {
            let first = edges[0];
            let last = edges[bins];
            for &value in values {
                if value < first || value > last || value.is_nan() {
                    continue;
                }
                // index of the first edge strictly greater than the value
                let upper = edges.partition_point(|&edge| edge <= value);
                let bin = upper.saturating_sub(1).min(bins - 1);
                counts[bin] += 1;
            }
        }
        Self { edges, counts }
    }

    /// 5 mm rings out to 80 mm.
    pub fn linear(values: &[f64]) -> Self {
        Self::new(values, linear_edges(DEFAULT_RING_WIDTH, DEFAULT_MAX_RADIUS))
    }

    /// 2000 mm² rings out to `max_radius`.
    pub fn equal_area(values: &[f64], max_radius: f64) -> Self {
        Self::new(values, equal_area_edges(DEFAULT_RING_AREA, max_radius))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(low, high, count)` for every bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(pair, &count)| (pair[0], pair[1], count))
    }
}
