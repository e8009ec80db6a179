//! Barrier-bounded flood filling.
//!
//! Starting from the cell containing a seed point, every 4-connected cell
//! whose source elevation lies strictly below the flood level is flooded.
//! Cells at or above the level, and cells without data, are barriers.

use terrain_common::Point3;

use crate::error::{Result, TerrainError};
use crate::grid::ScalarGrid;

/// Theme assigned to flood-fill output.
pub const FLOOD_THEME: &str = "Flooded_area";

/// Flood `source` from `seed.x, seed.y` up to the level `seed.z`.
///
/// Returns a new grid of the same geometry in which flooded cells hold the
/// flood level and all other cells are unset. Fails with
/// [`TerrainError::SeedOutsideGrid`] if the seed lies outside the grid's
/// extent under its interpretation.
pub fn flood_fill(source: &ScalarGrid, seed: &Point3) -> Result<ScalarGrid> {
    let (seed_row, seed_col) = source
        .geometry()
        .locate(seed.x, seed.y, source.interpretation())
        .ok_or(TerrainError::SeedOutsideGrid {
            x: seed.x,
            y: seed.y,
        })?;

    let rows = source.rows();
    let cols = source.cols();
    let level = seed.z;
    let below = |row: usize, col: usize| {
        source
            .sample(row as isize, col as isize)
            .map_or(false, |z| z < level)
    };

    let mut flooded = vec![false; rows * cols];
    let mut pending = vec![(seed_row, seed_col)];
    while let Some((row, col)) = pending.pop() {
        let idx = row * cols + col;
        if flooded[idx] || !below(row, col) {
            continue;
        }
        flooded[idx] = true;

        if row > 0 {
            pending.push((row - 1, col));
        }
        if row + 1 < rows {
            pending.push((row + 1, col));
        }
        if col > 0 {
            pending.push((row, col - 1));
        }
        if col + 1 < cols {
            pending.push((row, col + 1));
        }
    }

    let values = flooded.iter().map(|&f| f.then_some(level)).collect();
    let output = ScalarGrid::from_options(source.geometry().clone(), values)?
        .with_interpretation(source.interpretation())
        .with_theme(FLOOD_THEME);

    tracing::debug!(
        seed_row,
        seed_col,
        level,
        flooded = output.count_set(),
        "Flood fill complete"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GridGeometry, GridInterpretation};

    fn grid(cols: usize, rows: usize, values: &[f64]) -> ScalarGrid {
        let geometry = GridGeometry::new(cols, rows, 0.0, 0.0, 1.0, 1.0).unwrap();
        ScalarGrid::from_values(geometry, values).unwrap()
    }

    #[test]
    fn test_flat_grid_floods_completely() {
        let source = grid(3, 3, &[0.0; 9]);
        let flooded = flood_fill(&source, &Point3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(flooded.count_set(), 9);
        assert!(flooded.to_options().iter().all(|v| *v == Some(1.0)));
        assert_eq!(flooded.theme(), FLOOD_THEME);
        // Source untouched.
        assert_eq!(source.max(), Some(0.0));
    }

    #[test]
    fn test_ridge_blocks_flood() {
        #[rustfmt::skip]
        let source = grid(5, 3, &[
            0.0, 0.0, 5.0, 0.0, 0.0,
            0.0, 0.0, 5.0, 0.0, 0.0,
            0.0, 0.0, 5.0, 0.0, 0.0,
        ]);
        let flooded = flood_fill(&source, &Point3::new(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(flooded.count_set(), 6);
        assert_eq!(flooded.get(1, 3).unwrap(), None);
        assert_eq!(flooded.get(1, 2).unwrap(), None);
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        #[rustfmt::skip]
        let source = grid(2, 2, &[
            0.0, 9.0,
            9.0, 0.0,
        ]);
        let flooded = flood_fill(&source, &Point3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(flooded.count_set(), 1);
    }

    #[test]
    fn test_seed_on_barrier_floods_nothing() {
        let source = grid(2, 2, &[3.0; 4]);
        let flooded = flood_fill(&source, &Point3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(flooded.count_set(), 0);
    }

    #[test]
    fn test_unset_cells_are_barriers() {
        let geometry = GridGeometry::new(3, 1, 0.0, 0.0, 1.0, 1.0).unwrap();
        let source =
            ScalarGrid::from_options(geometry, vec![Some(0.0), None, Some(0.0)]).unwrap();
        let flooded = flood_fill(&source, &Point3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(flooded.to_options(), vec![Some(1.0), None, None]);
    }

    #[test]
    fn test_seed_checked_against_interpretation_extent() {
        let source = grid(3, 3, &[0.0; 9]);
        let level = |x: f64| Point3::new(x, 1.0, 1.0);

        // Cell extent is [-0.5, 2.5], edges inclusive.
        assert!(flood_fill(&source, &level(2.5)).is_ok());
        assert!(flood_fill(&source, &level(-0.5)).is_ok());
        assert!(flood_fill(&source, &level(2.6)).is_err());

        // Lattice extent is [0, 2].
        let lattice = source.clone().with_interpretation(GridInterpretation::Lattice);
        assert!(flood_fill(&lattice, &level(2.0)).is_ok());
        assert_eq!(
            flood_fill(&lattice, &level(-0.4)).unwrap_err(),
            TerrainError::SeedOutsideGrid { x: -0.4, y: 1.0 }
        );
        assert!(flood_fill(&lattice, &level(2.4)).is_err());
    }

    #[test]
    fn test_seed_outside_grid() {
        let source = grid(2, 2, &[0.0; 4]);
        assert_eq!(
            flood_fill(&source, &Point3::new(5.0, 0.0, 1.0)).unwrap_err(),
            TerrainError::SeedOutsideGrid { x: 5.0, y: 0.0 }
        );
    }
}
