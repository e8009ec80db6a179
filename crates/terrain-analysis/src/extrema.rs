//! Local and global elevation extrema.
//!
//! A set cell is a local minimum (maximum) if no set cell among its eight
//! neighbours is strictly smaller (larger). Each local extremum gets a
//! category: the largest window radius `k` for which the property still
//! holds against every set cell within `k` rows and columns.
//!
//! Global mode reports every cell tying the grid minimum and maximum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use terrain_common::Point3;

use crate::error::{Result, TerrainError};
use crate::grid::ScalarGrid;

/// Which extrema an [`ExtremumDetector`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremumMode {
    LocalMin,
    LocalMax,
    Global,
}

impl ExtremumMode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalMin => "local_min",
            Self::LocalMax => "local_max",
            Self::Global => "global",
        }
    }
}

impl FromStr for ExtremumMode {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "local_min" | "min" => Ok(Self::LocalMin),
            "local_max" | "max" => Ok(Self::LocalMax),
            "global" => Ok(Self::Global),
            other => Err(TerrainError::invalid_parameter(format!(
                "unknown extremum mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExtremumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimum or maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Minimum,
    Maximum,
}

impl ExtremumKind {
    /// Numeric attribute value: -1 for minima, +1 for maxima.
    pub fn value(&self) -> i8 {
        match self {
            Self::Minimum => -1,
            Self::Maximum => 1,
        }
    }

    /// Whether `other` beats `z` for this kind of extremum.
    fn exceeds(&self, other: f64, z: f64) -> bool {
        match self {
            Self::Minimum => other < z,
            Self::Maximum => other > z,
        }
    }
}

/// The named scalar attribute attached to an extremum feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureAttribute {
    /// Window radius up to which a local extremum holds.
    Category(u32),
    /// Kind of a global extremum.
    ExtremumType(ExtremumKind),
}

impl FeatureAttribute {
    /// Attribute name for feature writers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Category(_) => "CATEGORY",
            Self::ExtremumType(_) => "EXTR_TYPE",
        }
    }

    /// Attribute value for feature writers.
    pub fn value(&self) -> f64 {
        match self {
            Self::Category(k) => f64::from(*k),
            Self::ExtremumType(kind) => f64::from(kind.value()),
        }
    }
}

/// An attributed point feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttrFeature {
    pub point: Point3,
    pub row: usize,
    pub col: usize,
    pub attribute: FeatureAttribute,
}

/// Locates extrema of a scalar grid.
#[derive(Debug, Clone, Copy)]
pub struct ExtremumDetector {
    mode: ExtremumMode,
}

impl ExtremumDetector {
    pub fn new(mode: ExtremumMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExtremumMode {
        self.mode
    }

    /// Detect extrema; `None` when nothing is found.
    pub fn detect(&self, grid: &ScalarGrid) -> Option<Vec<AttrFeature>> {
        let features = match self.mode {
            ExtremumMode::LocalMin => local_extrema(grid, ExtremumKind::Minimum),
            ExtremumMode::LocalMax => local_extrema(grid, ExtremumKind::Maximum),
            ExtremumMode::Global => global_extrema(grid),
        };

        tracing::debug!(
            mode = %self.mode,
            features = features.len(),
            "Extremum detection complete"
        );

        (!features.is_empty()).then_some(features)
    }
}

fn feature(
    grid: &ScalarGrid,
    row: usize,
    col: usize,
    z: f64,
    attribute: FeatureAttribute,
) -> AttrFeature {
    let (x, y) = grid.geometry().vertex_unchecked(row, col);
    AttrFeature {
        point: Point3::new(x, y, z),
        row,
        col,
        attribute,
    }
}

/// Whether no set cell on the square ring at distance `k` beats `z`.
fn ring_holds(
    grid: &ScalarGrid,
    kind: ExtremumKind,
    row: usize,
    col: usize,
    z: f64,
    k: isize,
) -> bool {
    let (r, c) = (row as isize, col as isize);
    for dr in -k..=k {
        for dc in -k..=k {
            if dr.abs() != k && dc.abs() != k {
                continue;
            }
            if let Some(v) = grid.sample(r + dr, c + dc) {
                if kind.exceeds(v, z) {
                    return false;
                }
            }
        }
    }
    true
}

/// Largest radius up to which the extremum holds.
fn category(grid: &ScalarGrid, kind: ExtremumKind, row: usize, col: usize, z: f64) -> u32 {
    let max_radius = grid.rows().max(grid.cols()) - 1;
    // Beyond this radius every ring lies outside the grid.
    let reach = row
        .max(grid.rows() - 1 - row)
        .max(col)
        .max(grid.cols() - 1 - col);

    for k in 1..=reach.min(max_radius) {
        if !ring_holds(grid, kind, row, col, z, k as isize) {
            return (k - 1) as u32;
        }
    }
    max_radius as u32
}

fn local_extrema(grid: &ScalarGrid, kind: ExtremumKind) -> Vec<AttrFeature> {
    grid.iter_set()
        .filter(|&(row, col, z)| ring_holds(grid, kind, row, col, z, 1))
        .map(|(row, col, z)| {
            let k = category(grid, kind, row, col, z);
            feature(grid, row, col, z, FeatureAttribute::Category(k))
        })
        .collect()
}

fn global_extrema(grid: &ScalarGrid) -> Vec<AttrFeature> {
    let mut min: Option<(f64, Vec<(usize, usize)>)> = None;
    let mut max: Option<(f64, Vec<(usize, usize)>)> = None;

    for (row, col, z) in grid.iter_set() {
        match &mut min {
            Some((m, cells)) if z == *m => cells.push((row, col)),
            Some((m, _)) if z > *m => {}
            _ => min = Some((z, vec![(row, col)])),
        }
        match &mut max {
            Some((m, cells)) if z == *m => cells.push((row, col)),
            Some((m, _)) if z < *m => {}
            _ => max = Some((z, vec![(row, col)])),
        }
    }

    let mut features = Vec::new();
    for (kind, found) in [(ExtremumKind::Minimum, min), (ExtremumKind::Maximum, max)] {
        if let Some((z, cells)) = found {
            features.extend(cells.into_iter().map(|(row, col)| {
                feature(grid, row, col, z, FeatureAttribute::ExtremumType(kind))
            }));
        }
    }
    features
}
