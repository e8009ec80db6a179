//! Common test fixtures for terrain tests.
//!
//! Grid layouts are plain tuples so they can be turned into whatever
//! geometry type the calling crate uses.

/// Common grid layouts for testing.
pub mod grid {
    /// Grid layout for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub cols: usize,
        pub rows: usize,
        pub origin_x: f64,
        pub origin_y: f64,
        pub dx: f64,
        pub dy: f64,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.cols * self.rows
        }

        /// Returns the lattice extent as (min_x, min_y, max_x, max_y).
        pub fn extent(&self) -> (f64, f64, f64, f64) {
            (
                self.origin_x,
                self.origin_y,
                self.origin_x + (self.cols - 1) as f64 * self.dx,
                self.origin_y + (self.rows - 1) as f64 * self.dy,
            )
        }
    }

    /// 3x3 unit grid at the origin.
    pub const UNIT_3X3: GridSpec = GridSpec {
        cols: 3,
        rows: 3,
        origin_x: 0.0,
        origin_y: 0.0,
        dx: 1.0,
        dy: 1.0,
    };

    /// Single row of three cells with spacing 5.
    pub const LINE_3X1: GridSpec = GridSpec {
        cols: 3,
        rows: 1,
        origin_x: 0.0,
        origin_y: 0.0,
        dx: 5.0,
        dy: 5.0,
    };

    /// 25 m DEM tile in projected coordinates (UTM-like).
    pub const DEM_25M: GridSpec = GridSpec {
        cols: 41,
        rows: 41,
        origin_x: 350_000.0,
        origin_y: 5_700_000.0,
        dx: 25.0,
        dy: 25.0,
    };

    /// Anisotropic grid (dx != dy).
    pub const ANISOTROPIC: GridSpec = GridSpec {
        cols: 8,
        rows: 5,
        origin_x: -10.0,
        origin_y: 20.0,
        dx: 2.0,
        dy: 0.5,
    };
}

/// Canonical value sets.
pub mod values {
    /// Peak in the middle, four equal corner minima (3x3, row-major).
    pub const PEAK_3X3: [f64; 9] = [1.0, 2.0, 1.0, 2.0, 5.0, 2.0, 1.0, 2.0, 1.0];

    /// A basin enclosed by a rim of height 10 (5x5, row-major).
    #[rustfmt::skip]
    pub const BASIN_5X5: [f64; 25] = [
        10.0, 10.0, 10.0, 10.0, 10.0,
        10.0,  2.0,  1.0,  2.0, 10.0,
        10.0,  1.0,  0.0,  1.0, 10.0,
        10.0,  2.0,  1.0,  2.0, 10.0,
        10.0, 10.0, 10.0, 10.0, 10.0,
    ];
}

/// Common reference-system codes.
pub mod crs {
    pub const ETRS89_UTM32: &str = "EPSG:25832";
    pub const WGS84: &str = "EPSG:4326";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec_extent() {
        assert_eq!(grid::UNIT_3X3.extent(), (0.0, 0.0, 2.0, 2.0));
        assert_eq!(grid::DEM_25M.size(), 1681);
    }
}
