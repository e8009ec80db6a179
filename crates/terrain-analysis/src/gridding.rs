//! Gridding of scattered 3-D samples onto a regular grid.
//!
//! Every sample contributes to all grid vertices within the search radius.
//! Candidate vertices are enumerated from an index rectangle around the
//! sample that is one cell wider than the radius on each side, then
//! filtered by true Euclidean distance.
//!
//! Supported kernels:
//! - **Nearest neighbour**: the closest sample wins, ties keep the first
//! - **Inverse distance**: `1 / r^p`
//! - **Triangle**: `1 - r / R`
//! - **Franke-Little**: `((R - r) / (R * r))^2`
//!
//! Weights are capped at [`MAX_WEIGHT`] so coincident samples do not
//! produce infinite weights.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use terrain_common::Point3;

use crate::config::GriddingConfig;
use crate::error::{Result, TerrainError};
use crate::geometry::GridGeometry;
use crate::grid::ScalarGrid;

/// Upper bound for any single sample weight.
pub const MAX_WEIGHT: f64 = 1e10;

/// Theme assigned to gridded output.
pub const ELEVATION_THEME: &str = "Elevation";

/// Kernel used to combine the samples found around a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightFunction {
    NearestNeighbor,
    #[default]
    InverseDistance,
    Triangle,
    FrankeLittle,
}

impl WeightFunction {
    /// Get the kernel name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NearestNeighbor => "nearest_neighbor",
            Self::InverseDistance => "inverse_distance",
            Self::Triangle => "triangle",
            Self::FrankeLittle => "franke_little",
        }
    }

    /// Weight of a sample at distance `r` for search radius `radius`.
    ///
    /// Returns `None` for nearest neighbour, which does not weight.
    pub fn weight(&self, r: f64, radius: f64, exponent: f64) -> Option<f64> {
        match self {
            Self::NearestNeighbor => None,
            Self::InverseDistance => {
                if r <= MAX_WEIGHT.powf(-1.0 / exponent) {
                    Some(MAX_WEIGHT)
                } else {
                    Some(1.0 / r.powf(exponent))
                }
            }
            Self::Triangle => Some(1.0 - r / radius),
            Self::FrankeLittle => {
                let num = radius - r;
                let den = radius * r;
                if num <= MAX_WEIGHT.sqrt() * den {
                    let w = num / den;
                    Some(w * w)
                } else {
                    Some(MAX_WEIGHT)
                }
            }
        }
    }
}

impl FromStr for WeightFunction {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "nearest_neighbor" | "nearest_neighbour" | "nearest" => Ok(Self::NearestNeighbor),
            "inverse_distance" | "idw" => Ok(Self::InverseDistance),
            "triangle" | "triangular" => Ok(Self::Triangle),
            "franke_little" => Ok(Self::FrankeLittle),
            other => Err(TerrainError::invalid_parameter(format!(
                "unknown weight function '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for WeightFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Converts scattered samples into a [`ScalarGrid`] of a target geometry.
#[derive(Debug, Clone)]
pub struct PointGridder {
    geometry: GridGeometry,
    search_radius: f64,
    weight_function: WeightFunction,
    exponent: f64,
}

impl PointGridder {
    /// Create a gridder for `geometry` from a validated configuration.
    pub fn new(geometry: GridGeometry, config: &GriddingConfig) -> Result<Self> {
        config.validate().map_err(TerrainError::invalid_parameter)?;
        Ok(Self {
            geometry,
            search_radius: config.search_radius,
            weight_function: config.weight_function,
            exponent: config.inverse_distance_exponent,
        })
    }

    /// Create a gridder with the given radius and kernel and default exponent.
    pub fn with_radius(
        geometry: GridGeometry,
        search_radius: f64,
        weight_function: WeightFunction,
    ) -> Result<Self> {
        let config = GriddingConfig {
            search_radius,
            weight_function,
            ..Default::default()
        };
        Self::new(geometry, &config)
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    pub fn weight_function(&self) -> WeightFunction {
        self.weight_function
    }

    /// Bytes needed for the two per-cell accumulation arrays.
    pub fn estimate_memory_consumption(&self) -> usize {
        2 * self.geometry.cell_count() * std::mem::size_of::<f64>()
    }

    /// Number of lattice vertices within the search radius of a vertex,
    /// including the vertex itself. Ignores the grid border.
    pub fn points_in_search_circle(&self) -> usize {
        let (dx, dy) = self.geometry.spacing();
        let reach_x = (self.search_radius / dx).floor() as i64;
        let reach_y = (self.search_radius / dy).floor() as i64;
        let r2 = self.search_radius * self.search_radius;

        let mut count = 0;
        for i in -reach_y..=reach_y {
            for j in -reach_x..=reach_x {
                let sx = j as f64 * dx;
                let sy = i as f64 * dy;
                if sx * sx + sy * sy <= r2 {
                    count += 1;
                }
            }
        }
        count
    }

    /// Grid the samples.
    ///
    /// Vertices with no sample in range stay unset. An empty sample list
    /// yields a fully unset grid.
    pub fn grid(&self, points: &[Point3]) -> Result<ScalarGrid> {
        let n = self.geometry.cell_count();
        let nearest = self.weight_function == WeightFunction::NearestNeighbor;

        // Nearest neighbour keeps the best distance in `weights` and the
        // winning z in `sums`.
        let mut weights = vec![if nearest { f64::INFINITY } else { 0.0 }; n];
        let mut sums = vec![0.0; n];

        if points.is_empty() {
            tracing::warn!("Gridding an empty point set, all cells stay unset");
        }

        let mut skipped = 0usize;
        for p in points {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                skipped += 1;
                continue;
            }
            self.accumulate(p, &mut weights, &mut sums);
        }
        if skipped > 0 {
            tracing::warn!(skipped, "Ignored samples with non-finite coordinates");
        }

        let values = weights
            .iter()
            .zip(&sums)
            .map(|(&w, &s)| {
                if nearest {
                    w.is_finite().then_some(s)
                } else {
                    (w > 0.0).then(|| s / w)
                }
            })
            .collect();
        let grid = ScalarGrid::from_options(self.geometry.clone(), values)?
            .with_theme(ELEVATION_THEME);

        tracing::debug!(
            cols = self.geometry.cols(),
            rows = self.geometry.rows(),
            points = points.len(),
            set_cells = grid.count_set(),
            weight_function = %self.weight_function,
            radius = self.search_radius,
            "Gridded point set"
        );

        Ok(grid)
    }

    fn accumulate(&self, p: &Point3, weights: &mut [f64], sums: &mut [f64]) {
        let (dx, dy) = self.geometry.spacing();
        let (fi, fj) = self.geometry.fractional_index(p.x, p.y);
        let rows = self.geometry.rows();
        let cols = self.geometry.cols();

        let Some((row_lo, row_hi)) =
            index_window(fi, self.search_radius / dy, rows)
        else {
            return;
        };
        let Some((col_lo, col_hi)) =
            index_window(fj, self.search_radius / dx, cols)
        else {
            return;
        };

        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let (x, y) = self.geometry.vertex_unchecked(row, col);
                let r = ((x - p.x).powi(2) + (y - p.y).powi(2)).sqrt();
                if r > self.search_radius {
                    continue;
                }

                let idx = row * cols + col;
                match self.weight_function.weight(r, self.search_radius, self.exponent) {
                    Some(w) => {
                        weights[idx] += w;
                        sums[idx] += w * p.z;
                    }
                    None => {
                        if r < weights[idx] {
                            weights[idx] = r;
                            sums[idx] = p.z;
                        }
                    }
                }
            }
        }
    }
}

/// Index range `floor(f - reach) - 1 ..= ceil(f + reach) + 1` clamped to
/// `[0, n - 1]`, `None` if it misses the axis entirely.
fn index_window(f: f64, reach: f64, n: usize) -> Option<(usize, usize)> {
    let lo = (f - reach).floor() - 1.0;
    let hi = (f + reach).ceil() + 1.0;
    if hi < 0.0 || lo > (n - 1) as f64 {
        return None;
    }
    Some((lo.max(0.0) as usize, hi.min((n - 1) as f64) as usize))
}
