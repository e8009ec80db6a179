//! Finite-difference gradients, slope, aspect and curvature.
//!
//! Every output cell is derived from the 3x3 neighbourhood of the input
//! cell. Row `+1` is north (y grows with the row index), column `+1` is
//! east. Neighbours outside the grid count as unset.
//!
//! Partial derivatives use Horn's kernel, which needs the six cells on
//! the two sides of the axis. With the fallback chain enabled, a missing
//! Horn input falls back to central, then forward, then backward
//! differences.
//!
//! Curvature fits a biquadratic surface through the full neighbourhood
//! and is undefined wherever a neighbour is missing or the fit is flat.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::config::GradientConfig;
use crate::error::{Result, TerrainError};
use crate::grid::ScalarGrid;

/// Aspect reported for flat cells (both derivatives zero).
pub const FLAT_ASPECT: f64 = -1.0;

/// Curvature outputs are scaled by this factor.
pub const CURVATURE_SCALE: f64 = 100.0;

/// Quantity derived by a [`GradientOperator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMode {
    DzDx,
    DzDy,
    Slope,
    SlopePercent,
    SlopeDegrees,
    AspectRadians,
    AspectDegrees,
    AspectGon,
    #[serde(rename = "aspect_4")]
    Aspect4,
    #[serde(rename = "aspect_8")]
    Aspect8,
    ProfileCurvature,
    PlanCurvature,
    TryInfo,
}

impl GradientMode {
    pub const ALL: [GradientMode; 13] = [
        Self::DzDx,
        Self::DzDy,
        Self::Slope,
        Self::SlopePercent,
        Self::SlopeDegrees,
        Self::AspectRadians,
        Self::AspectDegrees,
        Self::AspectGon,
        Self::Aspect4,
        Self::Aspect8,
        Self::ProfileCurvature,
        Self::PlanCurvature,
        Self::TryInfo,
    ];

    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DzDx => "dz_dx",
            Self::DzDy => "dz_dy",
            Self::Slope => "slope",
            Self::SlopePercent => "slope_percent",
            Self::SlopeDegrees => "slope_degrees",
            Self::AspectRadians => "aspect_radians",
            Self::AspectDegrees => "aspect_degrees",
            Self::AspectGon => "aspect_gon",
            Self::Aspect4 => "aspect_4",
            Self::Aspect8 => "aspect_8",
            Self::ProfileCurvature => "profile_curvature",
            Self::PlanCurvature => "plan_curvature",
            Self::TryInfo => "try_info",
        }
    }

    /// Theme name given to output grids.
    pub fn theme(&self) -> &'static str {
        match self {
            Self::DzDx => "dZ/dX_gradients",
            Self::DzDy => "dZ/dY_gradients",
            Self::Slope => "Slope",
            Self::SlopePercent => "Slope_[%]",
            Self::SlopeDegrees => "Slope_[degr]",
            Self::AspectRadians => "Aspect_[rad]",
            Self::AspectDegrees => "Aspect_[degr]",
            Self::AspectGon => "Aspect_[gon]",
            Self::Aspect4 => "Aspect_[4+1_categories]",
            Self::Aspect8 => "Aspect_[8+1_categories]",
            Self::ProfileCurvature => "Profile_Curvature_[x100]",
            Self::PlanCurvature => "Plan_Curvature_[x100]",
            Self::TryInfo => "Try_info_code",
        }
    }

    pub fn is_curvature(&self) -> bool {
        matches!(self, Self::ProfileCurvature | Self::PlanCurvature)
    }

    /// Derive this mode's value for one neighbourhood.
    pub fn evaluate(&self, nb: &Neighborhood, dx: f64, dy: f64, fallback: bool) -> Option<f64> {
        match self {
            Self::DzDx => nb.dz_dx(dx, fallback).map(|d| d.value),
            Self::DzDy => nb.dz_dy(dy, fallback).map(|d| d.value),
            Self::Slope => nb.slope(dx, dy, fallback),
            Self::SlopePercent => nb.slope(dx, dy, fallback).map(|s| 100.0 * s),
            Self::SlopeDegrees => nb.slope(dx, dy, fallback).map(|s| s.atan().to_degrees()),
            Self::AspectRadians => nb.aspect(dx, dy, fallback),
            Self::AspectDegrees => nb
                .aspect(dx, dy, fallback)
                .map(|a| if a == FLAT_ASPECT { a } else { a.to_degrees() }),
            Self::AspectGon => nb
                .aspect(dx, dy, fallback)
                .map(|a| if a == FLAT_ASPECT { a } else { a * 200.0 / PI }),
            Self::Aspect4 => nb
                .aspect(dx, dy, fallback)
                .map(|a| f64::from(aspect_category_4(a))),
            Self::Aspect8 => nb
                .aspect(dx, dy, fallback)
                .map(|a| f64::from(aspect_category_8(a))),
            Self::ProfileCurvature => SurfaceFit::from_neighborhood(nb, dx, dy)
                .and_then(|fit| fit.profile_curvature())
                .map(|c| CURVATURE_SCALE * c),
            Self::PlanCurvature => SurfaceFit::from_neighborhood(nb, dx, dy)
                .and_then(|fit| fit.plan_curvature())
                .map(|c| CURVATURE_SCALE * c),
            Self::TryInfo => {
                let code = |d: Option<Derivative>| d.map_or(0, |d| d.method.code());
                let x = code(nb.dz_dx(dx, fallback));
                let y = code(nb.dz_dy(dy, fallback));
                Some(f64::from(10 * x + y))
            }
        }
    }
}

impl FromStr for GradientMode {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                TerrainError::invalid_parameter(format!("unknown gradient mode '{}'", s))
            })
    }
}

impl fmt::Display for GradientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finite-difference scheme that produced a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceMethod {
    Horn,
    Central,
    Forward,
    Backward,
}

impl DifferenceMethod {
    /// Code used in the try-info output (0 is reserved for "undefined").
    pub fn code(&self) -> u8 {
        match self {
            Self::Horn => 1,
            Self::Central => 2,
            Self::Forward => 3,
            Self::Backward => 4,
        }
    }
}

/// A partial derivative and the scheme that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivative {
    pub value: f64,
    pub method: DifferenceMethod,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// The 3x3 neighbourhood of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood {
    /// `cells[d_row + 1][d_col + 1]`, row `+1` is north.
    cells: [[Option<f64>; 3]; 3],
}

impl Neighborhood {
    /// Gather the neighbourhood of `(row, col)`; cells outside the grid are unset.
    pub fn gather(grid: &ScalarGrid, row: usize, col: usize) -> Self {
        let mut cells = [[None; 3]; 3];
        for (dr, line) in cells.iter_mut().enumerate() {
            for (dc, cell) in line.iter_mut().enumerate() {
                *cell = grid.sample(row as isize + dr as isize - 1, col as isize + dc as isize - 1);
            }
        }
        Self { cells }
    }

    /// Build a neighbourhood from rows listed north to south, each west to east.
    pub fn from_rows(
        north: [Option<f64>; 3],
        middle: [Option<f64>; 3],
        south: [Option<f64>; 3],
    ) -> Self {
        Self {
            cells: [south, middle, north],
        }
    }

    /// Value at an offset from the center; `d_row = 1` is north.
    pub fn get(&self, d_row: isize, d_col: isize) -> Option<f64> {
        if !(-1..=1).contains(&d_row) || !(-1..=1).contains(&d_col) {
            return None;
        }
        self.cells[(d_row + 1) as usize][(d_col + 1) as usize]
    }

    pub fn center(&self) -> Option<f64> {
        self.get(0, 0)
    }

    /// Whether all nine cells are set.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Value at `step` along `axis` and `cross` across it.
    fn along(&self, axis: Axis, step: isize, cross: isize) -> Option<f64> {
        match axis {
            Axis::X => self.get(cross, step),
            Axis::Y => self.get(step, cross),
        }
    }

    fn derivative(&self, axis: Axis, spacing: f64, fallback: bool) -> Option<Derivative> {
        let horn = [(-1, 1.0), (0, 2.0), (1, 1.0)]
            .iter()
            .map(|&(cross, w)| {
                Some(w * (self.along(axis, 1, cross)? - self.along(axis, -1, cross)?))
            })
            .sum::<Option<f64>>();
        if let Some(sum) = horn {
            return Some(Derivative {
                value: sum / (8.0 * spacing),
                method: DifferenceMethod::Horn,
            });
        }
        if !fallback {
            return None;
        }

        let plus = self.along(axis, 1, 0);
        let here = self.along(axis, 0, 0);
        let minus = self.along(axis, -1, 0);
        let (value, method) = match (minus, here, plus) {
            (Some(m), _, Some(p)) => ((p - m) / (2.0 * spacing), DifferenceMethod::Central),
            (_, Some(c), Some(p)) => ((p - c) / spacing, DifferenceMethod::Forward),
            (Some(m), Some(c), _) => ((c - m) / spacing, DifferenceMethod::Backward),
            _ => return None,
        };
        Some(Derivative { value, method })
    }

    /// Partial derivative towards east.
    pub fn dz_dx(&self, dx: f64, fallback: bool) -> Option<Derivative> {
        self.derivative(Axis::X, dx, fallback)
    }

    /// Partial derivative towards north.
    pub fn dz_dy(&self, dy: f64, fallback: bool) -> Option<Derivative> {
        self.derivative(Axis::Y, dy, fallback)
    }

    /// Slope as rise over run.
    pub fn slope(&self, dx: f64, dy: f64, fallback: bool) -> Option<f64> {
        let gx = self.dz_dx(dx, fallback)?.value;
        let gy = self.dz_dy(dy, fallback)?.value;
        Some(gx.hypot(gy))
    }

    /// Aspect in radians, or [`FLAT_ASPECT`] for flat cells.
    pub fn aspect(&self, dx: f64, dy: f64, fallback: bool) -> Option<f64> {
        let gx = self.dz_dx(dx, fallback)?.value;
        let gy = self.dz_dy(dy, fallback)?.value;
        Some(aspect_radians(gx, gy))
    }
}

/// Compass direction of steepest descent, clockwise from north in `[0, 2π)`.
///
/// Returns [`FLAT_ASPECT`] when both derivatives are zero.
pub fn aspect_radians(dz_dx: f64, dz_dy: f64) -> f64 {
    if dz_dx == 0.0 && dz_dy == 0.0 {
        return FLAT_ASPECT;
    }
    let a = (1.5 * PI - dz_dy.atan2(dz_dx)).rem_euclid(2.0 * PI);
    if a >= 2.0 * PI {
        0.0
    } else {
        a
    }
}

/// Bucket an aspect (radians) into N, E, S, W as 1..=4; flat is 0.
pub fn aspect_category_4(aspect: f64) -> u8 {
    sector(aspect, 4)
}

/// Bucket an aspect (radians) into N, NE, E, ... NW as 1..=8; flat is 0.
pub fn aspect_category_8(aspect: f64) -> u8 {
    sector(aspect, 8)
}

fn sector(aspect: f64, sectors: u8) -> u8 {
    if aspect < 0.0 {
        return 0;
    }
    let width = 360.0 / f64::from(sectors);
    let index = ((aspect.to_degrees() + width / 2.0) / width).floor() as u64;
    (index % u64::from(sectors)) as u8 + 1
}

/// Coefficients of the local biquadratic surface through a full 3x3
/// neighbourhood.
///
/// `d` and `e` are the second-order terms along x and y, `f` the cross
/// term, `g` and `h` the first-order terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFit {
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
    pub h: f64,
}

impl SurfaceFit {
    /// Fit the surface; `None` unless all nine cells are set.
    pub fn from_neighborhood(nb: &Neighborhood, dx: f64, dy: f64) -> Option<Self> {
        let z1 = nb.get(1, -1)?;
        let z2 = nb.get(1, 0)?;
        let z3 = nb.get(1, 1)?;
        let z4 = nb.get(0, -1)?;
        let z5 = nb.get(0, 0)?;
        let z6 = nb.get(0, 1)?;
        let z7 = nb.get(-1, -1)?;
        let z8 = nb.get(-1, 0)?;
        let z9 = nb.get(-1, 1)?;

        let l = (dx * dx + dy * dy).sqrt() / 2f64.sqrt();
        let l2 = l * l;

        Some(Self {
            d: ((z4 + z6) / 2.0 - z5) / l2,
            e: ((z2 + z8) / 2.0 - z5) / l2,
            f: (-z1 + z3 + z7 - z9) / (4.0 * l2),
            g: (-z4 + z6) / (2.0 * l),
            h: (z2 - z8) / (2.0 * l),
        })
    }

    fn gradient_norm(&self) -> Option<f64> {
        let n = self.g * self.g + self.h * self.h;
        (n != 0.0).then_some(n)
    }

    /// Curvature in the direction of steepest slope.
    pub fn profile_curvature(&self) -> Option<f64> {
        let n = self.gradient_norm()?;
        let (d, e, f, g, h) = (self.d, self.e, self.f, self.g, self.h);
        Some(-2.0 * (d * g * g + e * h * h + f * g * h) / n)
    }

    /// Curvature across the direction of steepest slope.
    pub fn plan_curvature(&self) -> Option<f64> {
        let n = self.gradient_norm()?;
        let (d, e, f, g, h) = (self.d, self.e, self.f, self.g, self.h);
        Some(2.0 * (d * h * h + e * g * g + f * g * h) / n)
    }
}

/// Derives one [`GradientMode`] quantity for every cell of a grid.
#[derive(Debug, Clone, Copy)]
pub struct GradientOperator {
    mode: GradientMode,
    fallback: bool,
}

impl GradientOperator {
    /// Operator using Horn's kernel only.
    pub fn new(mode: GradientMode) -> Self {
        Self {
            mode,
            fallback: false,
        }
    }

    pub fn with_config(mode: GradientMode, config: &GradientConfig) -> Self {
        Self::new(mode).with_fallback(config.fallback_enabled)
    }

    /// Enable or disable the central/forward/backward fallback chain.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn mode(&self) -> GradientMode {
        self.mode
    }

    pub fn fallback(&self) -> bool {
        self.fallback
    }

    /// Derive a new grid of equal geometry; the input is not modified.
    pub fn transform(&self, grid: &ScalarGrid) -> Result<ScalarGrid> {
        let (dx, dy) = grid.geometry().spacing();
        if self.mode.is_curvature() {
            let ratio = dx / dy;
            if !(2.0 / 3.0..=1.5).contains(&ratio) {
                tracing::warn!(dx, dy, "Curvature on strongly anisotropic grid spacing");
            }
        }

        let mut values = Vec::with_capacity(grid.geometry().cell_count());
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let nb = Neighborhood::gather(grid, row, col);
                // Overflowing derivatives leave the cell unset.
                let value = self.mode.evaluate(&nb, dx, dy, self.fallback);
                values.push(value.filter(|v| v.is_finite()));
            }
        }

        let output = ScalarGrid::from_options(grid.geometry().clone(), values)?
            .with_interpretation(grid.interpretation())
            .with_theme(self.mode.theme());

        tracing::debug!(
            mode = %self.mode,
            fallback = self.fallback,
            cols = output.cols(),
            rows = output.rows(),
            set_cells = output.count_set(),
            "Computed gradient grid"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(rows: [[f64; 3]; 3]) -> Neighborhood {
        let [n, m, s] = rows.map(|r| r.map(Some));
        Neighborhood::from_rows(n, m, s)
    }

    #[test]
    fn test_horn_on_plane() {
        // z = 2x + 3y with unit spacing; north row is y + 1.
        let nb = full([[1.0, 3.0, 5.0], [-2.0, 0.0, 2.0], [-5.0, -3.0, -1.0]]);
        let gx = nb.dz_dx(1.0, false).unwrap();
        let gy = nb.dz_dy(1.0, false).unwrap();
        assert_eq!(gx.method, DifferenceMethod::Horn);
        assert!((gx.value - 2.0).abs() < 1e-12);
        assert!((gy.value - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_neighbor_without_fallback() {
        let nb = Neighborhood::from_rows(
            [Some(1.0), Some(1.0), None],
            [Some(0.0), Some(1.0), Some(2.0)],
            [Some(1.0), Some(1.0), Some(1.0)],
        );
        assert_eq!(nb.dz_dx(1.0, false), None);
        assert_eq!(
            nb.dz_dx(1.0, true),
            Some(Derivative {
                value: 1.0,
                method: DifferenceMethod::Central
            })
        );
    }

    #[test]
    fn test_fallback_chain_order() {
        let forward = Neighborhood::from_rows(
            [None, None, None],
            [None, Some(1.0), Some(3.0)],
            [None, None, None],
        );
        assert_eq!(
            forward.dz_dx(2.0, true),
            Some(Derivative {
                value: 1.0,
                method: DifferenceMethod::Forward
            })
        );

        let north_only = Neighborhood::from_rows(
            [None, Some(5.0), None],
            [None, Some(1.0), None],
            [None, None, None],
        );
        let gy = north_only.dz_dy(1.0, true).unwrap();
        assert_eq!(gy.method, DifferenceMethod::Forward);
        assert_eq!(gy.value, 4.0);

        let south_only = Neighborhood::from_rows(
            [None, None, None],
            [None, Some(1.0), None],
            [None, Some(4.0), None],
        );
        let gy = south_only.dz_dy(1.0, true).unwrap();
        assert_eq!(gy.method, DifferenceMethod::Backward);
        assert_eq!(gy.value, -3.0);
    }

    #[test]
    fn test_aspect_directions() {
        // Descending towards east.
        assert!((aspect_radians(-1.0, 0.0) - 0.5 * PI).abs() < 1e-12);
        // Descending towards north, at either end of [0, 2π).
        let north = aspect_radians(0.0, -1.0);
        assert!(north.min(2.0 * PI - north) < 1e-12);
        // Descending towards south.
        assert!((aspect_radians(0.0, 1.0) - PI).abs() < 1e-12);
        // Descending towards west.
        assert!((aspect_radians(1.0, 0.0) - 1.5 * PI).abs() < 1e-12);
        assert_eq!(aspect_radians(0.0, 0.0), FLAT_ASPECT);
    }

    #[test]
    fn test_aspect_categories() {
        let deg = |d: f64| d.to_radians();
        assert_eq!(aspect_category_8(FLAT_ASPECT), 0);
        assert_eq!(aspect_category_8(deg(0.0)), 1);
        assert_eq!(aspect_category_8(deg(22.4)), 1);
        assert_eq!(aspect_category_8(deg(22.6)), 2);
        assert_eq!(aspect_category_8(deg(90.0)), 3);
        assert_eq!(aspect_category_8(deg(337.6)), 1);
        assert_eq!(aspect_category_4(FLAT_ASPECT), 0);
        assert_eq!(aspect_category_4(deg(44.0)), 1);
        assert_eq!(aspect_category_4(deg(46.0)), 2);
        assert_eq!(aspect_category_4(deg(180.0)), 3);
        assert_eq!(aspect_category_4(deg(270.0)), 4);
        assert_eq!(aspect_category_4(deg(316.0)), 1);
    }

    #[test]
    fn test_curvature_requires_full_neighborhood() {
        let nb = Neighborhood::from_rows(
            [Some(1.0), Some(1.0), Some(1.0)],
            [Some(1.0), Some(1.0), Some(1.0)],
            [Some(1.0), None, Some(1.0)],
        );
        assert_eq!(SurfaceFit::from_neighborhood(&nb, 1.0, 1.0), None);
    }

    #[test]
    fn test_curvature_flat_is_undefined() {
        let nb = full([[1.0; 3]; 3]);
        let fit = SurfaceFit::from_neighborhood(&nb, 1.0, 1.0).unwrap();
        assert_eq!(fit.profile_curvature(), None);
        assert_eq!(fit.plan_curvature(), None);
    }

    #[test]
    fn test_curvature_on_parabolic_valley() {
        // z = x^2 + y: a valley along y rising northwards.
        let nb = full([[2.0, 1.0, 2.0], [1.0, 0.0, 1.0], [0.0, -1.0, 0.0]]);
        let fit = SurfaceFit::from_neighborhood(&nb, 1.0, 1.0).unwrap();
        assert!((fit.d - 1.0).abs() < 1e-12);
        assert!(fit.e.abs() < 1e-12);
        assert!(fit.f.abs() < 1e-12);
        assert!(fit.g.abs() < 1e-12);
        assert!((fit.h - 1.0).abs() < 1e-12);
        // No bending along the slope, bending across it.
        assert!(fit.profile_curvature().unwrap().abs() < 1e-12);
        assert!((fit.plan_curvature().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_try_info_codes() {
        let nb = Neighborhood::from_rows(
            [None, Some(2.0), None],
            [Some(0.0), Some(1.0), Some(2.0)],
            [None, None, None],
        );
        let code = GradientMode::TryInfo.evaluate(&nb, 1.0, 1.0, true).unwrap();
        assert_eq!(code, 23.0);
        let code = GradientMode::TryInfo.evaluate(&nb, 1.0, 1.0, false).unwrap();
        assert_eq!(code, 0.0);
    }

    #[test]
    fn test_mode_names_roundtrip() {
        for mode in GradientMode::ALL {
            assert_eq!(mode.as_str().parse::<GradientMode>().unwrap(), mode);
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
        assert!("steepness".parse::<GradientMode>().is_err());
    }
}
