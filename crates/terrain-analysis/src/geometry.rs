//! Equidistant, axis-aligned raster geometry.
//!
//! A [`GridGeometry`] describes where the samples of a grid sit in the
//! plane:
//!
//! - sample `(row, col)` is at `(x0 + col * dx, y0 + row * dy)`
//! - row 0 lies at the origin's y and rows increase northwards
//! - the geometry never changes after construction
//!
//! Whether the sample coordinates denote vertices of a lattice or centers
//! of cells is a property of the grid that uses the geometry, see
//! [`GridInterpretation`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use terrain_common::{BoundingBox, ReferenceSystem};

use crate::error::{Result, TerrainError};

/// How sample coordinates relate to the grid's extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GridInterpretation {
    /// Samples are lattice vertices; the extent spans exactly the samples.
    Lattice,
    /// Samples are cell centers; the extent is padded by half a cell.
    #[default]
    Cell,
}

impl GridInterpretation {
    /// Get the interpretation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lattice => "lattice",
            Self::Cell => "cell",
        }
    }
}

impl FromStr for GridInterpretation {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lattice" | "vertex" => Ok(Self::Lattice),
            "cell" | "grid" => Ok(Self::Cell),
            other => Err(TerrainError::invalid_parameter(format!(
                "unknown grid interpretation '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for GridInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable description of an equidistant axis-aligned raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridGeometry {
    cols: usize,
    rows: usize,
    origin_x: f64,
    origin_y: f64,
    dx: f64,
    dy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_system: Option<ReferenceSystem>,
}

impl GridGeometry {
    /// Create a geometry with `cols x rows` samples.
    ///
    /// Fails with [`TerrainError::InvalidGeometry`] for zero dimensions,
    /// non-positive spacing or non-finite coordinates.
    pub fn new(
        cols: usize,
        rows: usize,
        origin_x: f64,
        origin_y: f64,
        dx: f64,
        dy: f64,
    ) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(TerrainError::invalid_geometry(format!(
                "grid must have at least one row and column, got {} x {}",
                cols, rows
            )));
        }
        if !(origin_x.is_finite() && origin_y.is_finite()) {
            return Err(TerrainError::invalid_geometry("origin must be finite"));
        }
        if !(dx.is_finite() && dx > 0.0 && dy.is_finite() && dy > 0.0) {
            return Err(TerrainError::invalid_geometry(format!(
                "cell spacing must be positive, got ({}, {})",
                dx, dy
            )));
        }

        Ok(Self {
            cols,
            rows,
            origin_x,
            origin_y,
            dx,
            dy,
            reference_system: None,
        })
    }

    /// Tag the geometry with a reference system.
    pub fn with_reference_system(mut self, reference_system: ReferenceSystem) -> Self {
        self.reference_system = Some(reference_system);
        self
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of samples.
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Coordinates of sample (0, 0).
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    /// Cell spacing `(dx, dy)`.
    pub fn spacing(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn reference_system(&self) -> Option<&ReferenceSystem> {
        self.reference_system.as_ref()
    }

    /// Row-major offset of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(TerrainError::index_out_of_bounds(
                row, col, self.rows, self.cols,
            ));
        }
        Ok(row * self.cols + col)
    }

    /// Planar coordinates of sample `(row, col)`.
    pub fn vertex(&self, row: usize, col: usize) -> Result<(f64, f64)> {
        self.index(row, col)?;
        Ok(self.vertex_unchecked(row, col))
    }

    pub(crate) fn vertex_unchecked(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.dx,
            self.origin_y + row as f64 * self.dy,
        )
    }

    /// Fractional `(row, col)` index of a planar position.
    ///
    /// Integral values fall exactly on samples. The result is not clamped.
    pub fn fractional_index(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (y - self.origin_y) / self.dy,
            (x - self.origin_x) / self.dx,
        )
    }

    /// The sample nearest to `(x, y)`, if the position lies in the grid.
    ///
    /// The position must fall inside the closed `extent(interpretation)`,
    /// all four edges inclusive. Under the cell interpretation each sample
    /// owns the square reaching half a cell to each side; a position on a
    /// boundary between two cells goes to the upper one, except on the
    /// outer top and right edges, which belong to the last row and column.
    pub fn locate(
        &self,
        x: f64,
        y: f64,
        interpretation: GridInterpretation,
    ) -> Option<(usize, usize)> {
        if !self.extent(interpretation).contains_point(x, y) {
            return None;
        }
        let (fi, fj) = self.fractional_index(x, y);
        let nearest = |f: f64, n: usize| ((f + 0.5).floor().max(0.0) as usize).min(n - 1);
        Some((nearest(fi, self.rows), nearest(fj, self.cols)))
    }

    /// Extent spanned by the samples themselves.
    pub fn envelope(&self) -> BoundingBox {
        let (max_x, max_y) = self.vertex_unchecked(self.rows - 1, self.cols - 1);
        BoundingBox::new(self.origin_x, self.origin_y, max_x, max_y)
    }

    /// Extent of the grid under the given interpretation.
    pub fn extent(&self, interpretation: GridInterpretation) -> BoundingBox {
        match interpretation {
            GridInterpretation::Lattice => self.envelope(),
            GridInterpretation::Cell => self.envelope().expand(self.dx / 2.0, self.dy / 2.0),
        }
    }

    /// Check whether two geometries describe the same sample positions.
    ///
    /// Dimensions must be equal and each lattice envelope coordinate must
    /// agree within `relative_tolerance` of its magnitude.
    pub fn is_coregistered(&self, other: &GridGeometry, relative_tolerance: f64) -> bool {
        if self.cols != other.cols || self.rows != other.rows {
            return false;
        }

        let a = self.envelope();
        let b = other.envelope();
        [
            (a.min_x, b.min_x),
            (a.min_y, b.min_y),
            (a.max_x, b.max_x),
            (a.max_y, b.max_y),
        ]
        .iter()
        .all(|&(u, v)| {
            let scale = u.abs().max(v.abs()).max(f64::MIN_POSITIVE);
            (u - v).abs() <= relative_tolerance * scale
        })
    }
}
