//! Cell-wise difference of two co-registered grids.

use crate::error::{Result, TerrainError};
use crate::grid::ScalarGrid;

/// Relative tolerance for comparing grid envelopes (0.1%).
pub const ENVELOPE_TOLERANCE: f64 = 0.001;

/// Compute `minuend - subtrahend` cell by cell.
///
/// Both grids must have the same dimensions and envelopes that agree within
/// [`ENVELOPE_TOLERANCE`]. A result cell is set only where both inputs are
/// set. The output uses the subtrahend's geometry and interpretation.
pub fn difference(subtrahend: &ScalarGrid, minuend: &ScalarGrid) -> Result<ScalarGrid> {
    let g1 = subtrahend.geometry();
    let g2 = minuend.geometry();
    if !g1.is_coregistered(g2, ENVELOPE_TOLERANCE) {
        return Err(TerrainError::geometry_mismatch(format!(
            "{} x {} grid with envelope {:?} vs {} x {} grid with envelope {:?}",
            g1.cols(),
            g1.rows(),
            g1.envelope(),
            g2.cols(),
            g2.rows(),
            g2.envelope()
        )));
    }

    let values = subtrahend
        .to_options()
        .into_iter()
        .zip(minuend.to_options())
        .map(|(a, b)| Some(b? - a?).filter(|d| d.is_finite()))
        .collect();

    let result = ScalarGrid::from_options(g1.clone(), values)?
        .with_interpretation(subtrahend.interpretation())
        .with_theme("Difference");

    tracing::debug!(
        cols = result.cols(),
        rows = result.rows(),
        set_cells = result.count_set(),
        "Computed grid difference"
    );

    Ok(result)
}
