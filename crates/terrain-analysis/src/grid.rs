//! Scalar grids with per-cell no-data flags.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

use terrain_common::{crs, BoundingBox, Point3, ReferenceSystem};

use crate::error::{Result, TerrainError};
use crate::geometry::{GridGeometry, GridInterpretation};

/// Cached value range of the set cells.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueBounds {
    /// Must be recomputed before use.
    Stale,
    /// No cell is set.
    Empty,
    Known { min: f64, max: f64 },
}

/// A 2-D array of optional scalar values over a [`GridGeometry`].
///
/// Values are stored row-major. A cell that is not set carries no
/// meaningful value and is reported as `None`.
///
/// The min/max of the set cells is computed on first query and cached.
/// Every mutation either updates the cache in constant time or marks it
/// for recomputation, so queries never see a stale range.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    geometry: GridGeometry,
    values: Vec<f64>,
    is_set: Vec<bool>,
    interpretation: GridInterpretation,
    theme: String,
    bounds: Cell<ValueBounds>,
}

impl ScalarGrid {
    /// Create a grid with every cell unset.
    pub fn new(geometry: GridGeometry) -> Self {
        let n = geometry.cell_count();
        Self {
            geometry,
            values: vec![0.0; n],
            is_set: vec![false; n],
            interpretation: GridInterpretation::default(),
            theme: String::new(),
            bounds: Cell::new(ValueBounds::Empty),
        }
    }

    /// Create a grid with every cell set from row-major `values`.
    ///
    /// Non-finite values are rejected; use [`ScalarGrid::from_options`] to
    /// leave cells unset.
    pub fn from_values(geometry: GridGeometry, values: &[f64]) -> Result<Self> {
        Self::check_len(&geometry, values.len())?;
        values.iter().try_for_each(|&z| check_finite(z))?;
        let n = values.len();
        Ok(Self {
            geometry,
            values: values.to_vec(),
            is_set: vec![true; n],
            interpretation: GridInterpretation::default(),
            theme: String::new(),
            bounds: Cell::new(ValueBounds::Stale),
        })
    }

    /// Create a grid from row-major optional values.
    pub fn from_options(geometry: GridGeometry, values: Vec<Option<f64>>) -> Result<Self> {
        Self::check_len(&geometry, values.len())?;
        values.iter().flatten().try_for_each(|&z| check_finite(z))?;
        let is_set = values.iter().map(Option::is_some).collect();
        let values = values.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        Ok(Self {
            geometry,
            values,
            is_set,
            interpretation: GridInterpretation::default(),
            theme: String::new(),
            bounds: Cell::new(ValueBounds::Stale),
        })
    }

    fn check_len(geometry: &GridGeometry, len: usize) -> Result<()> {
        if len != geometry.cell_count() {
            return Err(TerrainError::invalid_geometry(format!(
                "expected {} values for {} x {} grid, got {}",
                geometry.cell_count(),
                geometry.cols(),
                geometry.rows(),
                len
            )));
        }
        Ok(())
    }

    pub fn with_interpretation(mut self, interpretation: GridInterpretation) -> Self {
        self.interpretation = interpretation;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn interpretation(&self) -> GridInterpretation {
        self.interpretation
    }

    /// Thematic name of the values (e.g. `"Slope_[%]"`), empty if unnamed.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn rows(&self) -> usize {
        self.geometry.rows()
    }

    pub fn cols(&self) -> usize {
        self.geometry.cols()
    }

    /// Value of cell `(row, col)`, `None` if unset.
    pub fn get(&self, row: usize, col: usize) -> Result<Option<f64>> {
        let idx = self.geometry.index(row, col)?;
        Ok(self.is_set[idx].then(|| self.values[idx]))
    }

    pub fn is_set(&self, row: usize, col: usize) -> Result<bool> {
        let idx = self.geometry.index(row, col)?;
        Ok(self.is_set[idx])
    }

    /// Value at a signed position; anything outside the grid is unset.
    pub(crate) fn sample(&self, row: isize, col: isize) -> Option<f64> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let idx = row * self.cols() + col;
        self.is_set[idx].then(|| self.values[idx])
    }

    /// Set the value of cell `(row, col)`.
    pub fn set_value(&mut self, row: usize, col: usize, z: f64) -> Result<()> {
        let idx = self.geometry.index(row, col)?;
        check_finite(z)?;
        let previous = self.is_set[idx].then(|| self.values[idx]);
        self.values[idx] = z;
        self.is_set[idx] = true;
        self.note_set(previous, z);
        Ok(())
    }

    /// Clear the no-data flag of cell `(row, col)`.
    pub fn unset(&mut self, row: usize, col: usize) -> Result<()> {
        let idx = self.geometry.index(row, col)?;
        if !self.is_set[idx] {
            return Ok(());
        }
        self.is_set[idx] = false;
        let removed = self.values[idx];
        if let ValueBounds::Known { min, max } = self.bounds.get() {
            if removed == min || removed == max {
                self.bounds.set(ValueBounds::Stale);
            }
        }
        Ok(())
    }

    fn note_set(&self, previous: Option<f64>, z: f64) {
        let next = match self.bounds.get() {
            ValueBounds::Stale => ValueBounds::Stale,
            ValueBounds::Empty => ValueBounds::Known { min: z, max: z },
            ValueBounds::Known { min, max } => match previous {
                // Overwriting an extremum with a less extreme value loses it.
                Some(old) if (old == min && z > old) || (old == max && z < old) => {
                    ValueBounds::Stale
                }
                _ => ValueBounds::Known {
                    min: min.min(z),
                    max: max.max(z),
                },
            },
        };
        self.bounds.set(next);
    }

    fn current_bounds(&self) -> Option<(f64, f64)> {
        if self.bounds.get() == ValueBounds::Stale {
            self.bounds.set(self.scan_bounds());
        }
        match self.bounds.get() {
            ValueBounds::Known { min, max } => Some((min, max)),
            _ => None,
        }
    }

    fn scan_bounds(&self) -> ValueBounds {
        self.values
            .iter()
            .zip(&self.is_set)
            .filter(|(_, &set)| set)
            .fold(ValueBounds::Empty, |acc, (&z, _)| match acc {
                ValueBounds::Known { min, max } => ValueBounds::Known {
                    min: min.min(z),
                    max: max.max(z),
                },
                _ => ValueBounds::Known { min: z, max: z },
            })
    }

    /// Smallest set value, `None` if no cell is set.
    pub fn min(&self) -> Option<f64> {
        self.current_bounds().map(|(min, _)| min)
    }

    /// Largest set value, `None` if no cell is set.
    pub fn max(&self) -> Option<f64> {
        self.current_bounds().map(|(_, max)| max)
    }

    /// Whether every cell is set.
    pub fn is_complete(&self) -> bool {
        self.is_set.iter().all(|&s| s)
    }

    /// Number of set cells.
    pub fn count_set(&self) -> usize {
        self.is_set.iter().filter(|&&s| s).count()
    }

    /// Iterate over set cells as `(row, col, z)` in row-major order.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols();
        self.values
            .iter()
            .zip(&self.is_set)
            .enumerate()
            .filter(|(_, (_, &set))| set)
            .map(move |(idx, (&z, _))| (idx / cols, idx % cols, z))
    }

    /// Row-major copy of all cells.
    pub fn to_options(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .zip(&self.is_set)
            .map(|(&z, &set)| set.then_some(z))
            .collect()
    }

    /// Sample `(row, col)` as a 3-D point, `None` if unset.
    pub fn point(&self, row: usize, col: usize) -> Result<Option<Point3>> {
        let (x, y) = self.geometry.vertex(row, col)?;
        Ok(self.get(row, col)?.map(|z| Point3::new(x, y, z)))
    }

    /// Bilinear interpolation of the four samples around `(x, y)`.
    ///
    /// Returns `None` outside the lattice extent or when any of the four
    /// samples is unset.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let (fi, fj) = self.geometry.fractional_index(x, y);
        let (r0, r1, fy) = cell_span(fi, self.rows())?;
        let (c0, c1, fx) = cell_span(fj, self.cols())?;

        let s = |r: usize, c: usize| self.sample(r as isize, c as isize);
        let v00 = s(r0, c0)?;
        let v01 = s(r0, c1)?;
        let v10 = s(r1, c0)?;
        let v11 = s(r1, c1)?;

        let bottom = v00 * (1.0 - fx) + v01 * fx;
        let top = v10 * (1.0 - fx) + v11 * fx;
        Some(bottom * (1.0 - fy) + top * fy)
    }

    /// Like [`value_at`](Self::value_at) for a position tagged with a
    /// reference system. A tag differing from the grid's is an error.
    pub fn value_at_point(
        &self,
        position: &Point3,
        reference_system: Option<&ReferenceSystem>,
    ) -> Result<Option<f64>> {
        let grid_srs = self.geometry.reference_system();
        if reference_system.is_some() && !crs::compatible(grid_srs, reference_system) {
            return Err(TerrainError::reference_system_mismatch(
                grid_srs.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()),
                reference_system
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ));
        }
        Ok(self.value_at(position.x, position.y))
    }

    /// Assign `z` to every unset cell.
    pub fn fill_unset(&mut self, z: f64) -> Result<()> {
        check_finite(z)?;
        let mut filled = 0usize;
        for idx in 0..self.values.len() {
            if !self.is_set[idx] {
                self.values[idx] = z;
                self.is_set[idx] = true;
                self.note_set(None, z);
                filled += 1;
            }
        }
        tracing::debug!(filled, value = z, "Filled unset cells");
        Ok(())
    }

    /// Every set cell as a 3-D point, optionally restricted to `filter`.
    pub fn to_point_set(&self, filter: Option<&BoundingBox>) -> Vec<Point3> {
        self.iter_set()
            .map(|(row, col, z)| {
                let (x, y) = self.geometry.vertex_unchecked(row, col);
                Point3::new(x, y, z)
            })
            .filter(|p| filter.map_or(true, |bb| bb.contains_point(p.x, p.y)))
            .collect()
    }

    /// Descriptive summary for writers and logging.
    pub fn summary(&self) -> GridSummary {
        let bounds = self.current_bounds();
        GridSummary {
            cols: self.cols(),
            rows: self.rows(),
            interpretation: self.interpretation,
            theme: self.theme.clone(),
            set_cells: self.count_set(),
            total_cells: self.geometry.cell_count(),
            min: bounds.map(|(min, _)| min),
            max: bounds.map(|(_, max)| max),
            extent: self.geometry.extent(self.interpretation),
            reference_system: self.geometry.reference_system().cloned(),
        }
    }
}

fn check_finite(z: f64) -> Result<()> {
    if !z.is_finite() {
        return Err(TerrainError::invalid_parameter(format!(
            "grid value must be finite, got {}",
            z
        )));
    }
    Ok(())
}

/// Bracket a fractional index along an axis of `n` samples.
///
/// Returns the lower and upper sample index and the remainder within the
/// bracket, or `None` outside `[0, n - 1]`. At the last sample the
/// bracket is moved down one step so the remainder becomes 1.
pub(crate) fn cell_span(f: f64, n: usize) -> Option<(usize, usize, f64)> {
    if !(f >= 0.0 && f <= (n - 1) as f64) {
        return None;
    }
    if n == 1 {
        return Some((0, 0, 0.0));
    }
    let lo = (f.floor() as usize).min(n - 2);
    Some((lo, lo + 1, f - lo as f64))
}

/// Summary of a grid's shape and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    pub cols: usize,
    pub rows: usize,
    pub interpretation: GridInterpretation,
    pub theme: String,
    pub set_cells: usize,
    pub total_cells: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub extent: BoundingBox,
    pub reference_system: Option<ReferenceSystem>,
}
