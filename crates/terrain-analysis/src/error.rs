//! Error types for terrain analysis.
//!
//! Only conditions that make a call meaningless are errors. Missing data
//! (unset neighbours, flat terrain, empty inputs) is reported through
//! `Option` values and unset output cells instead.

use thiserror::Error;

/// Errors that can occur while building or analysing terrain grids.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// A row/column index outside `[0, rows) x [0, cols)`.
    #[error("index ({row}, {col}) is outside grid of {rows} rows x {cols} columns")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two grids that must be co-registered are not.
    #[error("grid geometry mismatch: {0}")]
    GeometryMismatch(String),

    /// A flood seed that does not fall into any grid cell.
    #[error("seed point ({x}, {y}) is outside the grid extent")]
    SeedOutsideGrid { x: f64, y: f64 },

    /// Invalid grid geometry (zero dimensions, non-positive spacing, bad value array).
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    /// An operation parameter outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A position tagged with a reference system other than the grid's.
    #[error("reference system mismatch: grid uses {grid}, position uses {position}")]
    ReferenceSystemMismatch { grid: String, position: String },
}

impl TerrainError {
    /// Create an IndexOutOfBounds error.
    pub fn index_out_of_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self::IndexOutOfBounds {
            row,
            col,
            rows,
            cols,
        }
    }

    /// Create a GeometryMismatch error.
    pub fn geometry_mismatch(msg: impl Into<String>) -> Self {
        Self::GeometryMismatch(msg.into())
    }

    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a ReferenceSystemMismatch error.
    pub fn reference_system_mismatch(
        grid: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self::ReferenceSystemMismatch {
            grid: grid.into(),
            position: position.into(),
        }
    }
}

/// Result type for terrain analysis operations.
pub type Result<T> = std::result::Result<T, TerrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_message() {
        let err = TerrainError::index_out_of_bounds(5, 2, 3, 4);
        assert_eq!(
            err.to_string(),
            "index (5, 2) is outside grid of 3 rows x 4 columns"
        );
    }

    #[test]
    fn test_reference_system_message() {
        let err = TerrainError::reference_system_mismatch("EPSG:25832", "EPSG:4326");
        assert!(err.to_string().contains("EPSG:25832"));
        assert!(err.to_string().contains("EPSG:4326"));
    }
}
