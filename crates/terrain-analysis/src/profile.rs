//! Cross-section profiles along a polyline.
//!
//! A profile is elevation as a function of station `t`, the planar
//! distance travelled along the polyline. Stations are registered at:
//!
//! - every crossing of a segment with an internal grid column or row line,
//!   interpolated linearly between the two samples on that line
//! - the polyline's first vertex and every segment end point, interpolated
//!   on the grid cell split into four triangles around its center
//!
//! Stations that coincide (e.g. a crossing exactly on a vertex) are merged.

use serde::{Deserialize, Serialize};

use terrain_common::{Point3, Polyline};

use crate::grid::{cell_span, ScalarGrid};

/// Segments shorter than this along an axis (in index units) are treated
/// as parallel to that axis's grid lines.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Relative distance under which two stations count as the same.
const STATION_EPSILON: f64 = 1e-9;

/// A station along a profile and the elevation there, if known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TzPair {
    pub t: f64,
    pub z: Option<f64>,
}

impl TzPair {
    pub fn new(t: f64, z: Option<f64>) -> Self {
        Self { t, z }
    }
}

/// An extracted profile: the defining polyline and its sorted stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    polyline: Polyline,
    pairs: Vec<TzPair>,
}

impl Profile {
    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    /// Stations in non-decreasing order of `t`.
    pub fn pairs(&self) -> &[TzPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Station of the polyline's start, always 0.
    pub fn t_start(&self) -> f64 {
        0.0
    }

    /// Station of the polyline's end (its planar length).
    pub fn t_end(&self) -> f64 {
        self.polyline.length()
    }

    /// First registered station.
    pub fn t_min(&self) -> Option<f64> {
        self.pairs.first().map(|p| p.t)
    }

    /// Last registered station.
    pub fn t_max(&self) -> Option<f64> {
        self.pairs.last().map(|p| p.t)
    }

    /// Lowest defined elevation.
    pub fn z_min(&self) -> Option<f64> {
        self.defined().map(|(_, z)| z).reduce(f64::min)
    }

    /// Highest defined elevation.
    pub fn z_max(&self) -> Option<f64> {
        self.defined().map(|(_, z)| z).reduce(f64::max)
    }

    /// Stations with a defined elevation as `(t, z)`.
    pub fn defined(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pairs.iter().filter_map(|p| p.z.map(|z| (p.t, z)))
    }
}

/// Extract the profile of `grid` along `polyline`.
///
/// Returns `None` for a polyline without vertices. Positions outside the
/// grid or next to unset samples produce stations without elevation
/// (end points) or no station at all (line crossings).
pub fn extract_profile(grid: &ScalarGrid, polyline: &Polyline) -> Option<Profile> {
    let first = polyline.vertices().first()?;

    let mut pairs = vec![TzPair::new(0.0, project_point(grid, first.x, first.y))];
    let mut t0 = 0.0;
    for (a, b) in polyline.segments() {
        let length = a.distance_xy(b);
        line_crossings(grid, a, b, t0, length, &mut pairs);
        pairs.push(TzPair::new(t0 + length, project_point(grid, b.x, b.y)));
        t0 += length;
    }

    let pairs = merge_stations(pairs);
    tracing::debug!(
        vertices = polyline.len(),
        stations = pairs.len(),
        length = t0,
        "Extracted profile"
    );

    Some(Profile {
        polyline: polyline.clone(),
        pairs,
    })
}

/// Register the crossings of segment `a`-`b` with the internal grid lines.
fn line_crossings(
    grid: &ScalarGrid,
    a: &Point3,
    b: &Point3,
    t0: f64,
    length: f64,
    pairs: &mut Vec<TzPair>,
) {
    let geometry = grid.geometry();
    let (ai, aj) = geometry.fractional_index(a.x, a.y);
    let (bi, bj) = geometry.fractional_index(b.x, b.y);
    let rows = grid.rows();
    let cols = grid.cols();

    // Column lines j = const.
    if (bj - aj).abs() > PARALLEL_EPSILON {
        for j in line_range(aj, bj, cols) {
            let s = (j as f64 - aj) / (bj - aj);
            if !(0.0..=1.0).contains(&s) {
                continue;
            }
            let fi = ai + s * (bi - ai);
            let Some((r0, r1, rem)) = cell_span(fi, rows) else {
                continue;
            };
            if let (Some(z1), Some(z2)) = (
                grid.sample(r0 as isize, j as isize),
                grid.sample(r1 as isize, j as isize),
            ) {
                pairs.push(TzPair::new(t0 + s * length, Some(z1 + rem * (z2 - z1))));
            }
        }
    }

    // Row lines i = const.
    if (bi - ai).abs() > PARALLEL_EPSILON {
        for i in line_range(ai, bi, rows) {
            let s = (i as f64 - ai) / (bi - ai);
            if !(0.0..=1.0).contains(&s) {
                continue;
            }
            let fj = aj + s * (bj - aj);
            let Some((c0, c1, rem)) = cell_span(fj, cols) else {
                continue;
            };
            if let (Some(z1), Some(z2)) = (
                grid.sample(i as isize, c0 as isize),
                grid.sample(i as isize, c1 as isize),
            ) {
                pairs.push(TzPair::new(t0 + s * length, Some(z1 + rem * (z2 - z1))));
            }
        }
    }
}

/// Integral grid lines between two fractional indices, clamped to `[0, n - 1]`.
fn line_range(f1: f64, f2: f64, n: usize) -> std::ops::RangeInclusive<usize> {
    let last = (n - 1) as f64;
    let lo = f1.min(f2).clamp(0.0, last).ceil() as usize;
    let hi = f1.max(f2).clamp(0.0, last).floor() as usize;
    lo..=hi
}

/// Elevation at `(x, y)` on the cell triangulated around its center.
///
/// The cell center carries the mean of the four corners. Returns `None`
/// outside the lattice or when a corner is unset.
pub fn project_point(grid: &ScalarGrid, x: f64, y: f64) -> Option<f64> {
    let (fi, fj) = grid.geometry().fractional_index(x, y);
    let (r0, r1, v) = cell_span(fi, grid.rows())?;
    let (c0, c1, u) = cell_span(fj, grid.cols())?;

    let s = |r: usize, c: usize| grid.sample(r as isize, c as isize);
    let ll = (0.0, 0.0, s(r0, c0)?);
    let lr = (1.0, 0.0, s(r0, c1)?);
    let ul = (0.0, 1.0, s(r1, c0)?);
    let ur = (1.0, 1.0, s(r1, c1)?);
    let center = (0.5, 0.5, (ll.2 + lr.2 + ul.2 + ur.2) / 4.0);

    // The diagonals split the cell into four triangles meeting at the
    // center; pick the one on the same side of both diagonals as (u, v).
    let triangle = if u + v > 1.0 {
        if u > v {
            [center, lr, ur]
        } else {
            [center, ur, ul]
        }
    } else if u > v {
        [center, ll, lr]
    } else {
        [center, ul, ll]
    };

    Some(barycentric(u, v, triangle))
}

/// Linear interpolation at `(u, v)` across a triangle of `(u, v, z)` vertices.
fn barycentric(u: f64, v: f64, [p1, p2, p3]: [(f64, f64, f64); 3]) -> f64 {
    let det = (p2.1 - p3.1) * (p1.0 - p3.0) + (p3.0 - p2.0) * (p1.1 - p3.1);
    let w1 = ((p2.1 - p3.1) * (u - p3.0) + (p3.0 - p2.0) * (v - p3.1)) / det;
    let w2 = ((p3.1 - p1.1) * (u - p3.0) + (p1.0 - p3.0) * (v - p3.1)) / det;
    let w3 = 1.0 - w1 - w2;
    w1 * p1.2 + w2 * p2.2 + w3 * p3.2
}

/// Sort stations and merge those at (numerically) equal `t`.
///
/// A merged station's elevation is the mean of the defined elevations in
/// its group, or undefined if none is defined.
fn merge_stations(mut pairs: Vec<TzPair>) -> Vec<TzPair> {
    pairs.sort_by(|a, b| a.t.total_cmp(&b.t));

    let mut merged: Vec<TzPair> = Vec::with_capacity(pairs.len());
    let mut sum = 0.0;
    let mut count = 0usize;
    for pair in pairs {
        let same = merged.last().map_or(false, |last| {
            (pair.t - last.t).abs() <= STATION_EPSILON * last.t.abs().max(1.0)
        });
        if !same {
            sum = 0.0;
            count = 0;
            merged.push(TzPair::new(pair.t, None));
        }
        if let Some(z) = pair.z {
            sum += z;
            count += 1;
        }
        if let Some(last) = merged.last_mut() {
            last.z = (count > 0).then(|| sum / count as f64);
        }
    }
    merged
}
