//! Test data generators for synthetic terrain.
//!
//! These generators create predictable, verifiable surfaces that can be
//! used across the test suite. Grids are returned as row-major `Vec<f64>`
//! (row 0 first) so this crate does not depend on the terrain crates.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);  // col=1, row=0
/// assert_eq!(grid[10], 1.0);    // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates an inclined plane `z = z0 + gx * x + gy * y` sampled at
/// `x = col * spacing`, `y = row * spacing`.
///
/// The partial derivatives of the result are exactly `gx` and `gy`.
pub fn create_plane_grid(
    width: usize,
    height: usize,
    spacing: f64,
    z0: f64,
    gx: f64,
    gy: f64,
) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 * spacing;
            let y = row as f64 * spacing;
            data.push(z0 + gx * x + gy * y);
        }
    }
    data
}

/// Creates a cone with its apex of height `peak` at the grid center,
/// falling off by one unit of z per unit of planar distance.
pub fn create_cone_grid(width: usize, height: usize, spacing: f64, peak: f64) -> Vec<f64> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = (col as f64 - cx) * spacing;
            let dy = (row as f64 - cy) * spacing;
            data.push(peak - (dx * dx + dy * dy).sqrt());
        }
    }
    data
}

/// Creates a paraboloid bowl `z = depth_scale * r^2` centered in the grid.
///
/// The single global minimum (0) sits at the center for odd dimensions.
pub fn create_bowl_grid(width: usize, height: usize, spacing: f64, depth_scale: f64) -> Vec<f64> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = (col as f64 - cx) * spacing;
            let dy = (row as f64 - cy) * spacing;
            data.push(depth_scale * (dx * dx + dy * dy));
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates an optional-valued grid from `values` with gaps at the given
/// `(col, row)` positions.
///
/// Useful for testing missing data handling.
pub fn create_grid_with_gaps(
    width: usize,
    height: usize,
    values: &[f64],
    gaps: &[(usize, usize)],
) -> Vec<Option<f64>> {
    let mut data: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    data.resize(width * height, None);
    for &(col, row) in gaps {
        if col < width && row < height {
            data[row * width + col] = None;
        }
    }
    data
}

/// Creates `count` deterministic pseudo-random samples `(x, y, z)` inside
/// `[0, extent_x] x [0, extent_y]`, with `z` in `[0, 100)`.
pub fn create_scattered_points(
    count: usize,
    extent_x: f64,
    extent_y: f64,
    seed: u32,
) -> Vec<(f64, f64, f64)> {
    (0..count as u32)
        .map(|i| {
            let fx = unit(simple_hash(i, 0, seed));
            let fy = unit(simple_hash(i, 1, seed));
            let fz = unit(simple_hash(i, 2, seed));
            (fx * extent_x, fy * extent_y, fz * 100.0)
        })
        .collect()
}

/// Samples of a function at every vertex of a `width x height` lattice.
pub fn sample_lattice<F>(width: usize, height: usize, spacing: f64, f: F) -> Vec<(f64, f64, f64)>
where
    F: Fn(f64, f64) -> f64,
{
    let mut points = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 * spacing;
            let y = row as f64 * spacing;
            points.push((x, y, f(x, y)));
        }
    }
    points
}

fn unit(h: u32) -> f64 {
    f64::from(h) / (f64::from(u32::MAX) + 1.0)
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_values() {
        let grid = create_plane_grid(3, 2, 2.0, 1.0, 0.5, -1.0);
        assert_eq!(grid, vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_cone_peak_at_center() {
        let grid = create_cone_grid(5, 5, 1.0, 10.0);
        assert_eq!(grid[12], 10.0);
        assert!(grid.iter().all(|&z| z <= 10.0));
    }

    #[test]
    fn test_bowl_minimum_at_center() {
        let grid = create_bowl_grid(3, 3, 1.0, 1.0);
        assert_eq!(grid[4], 0.0);
        assert_eq!(grid[0], 2.0);
    }

    #[test]
    fn test_grid_with_gaps() {
        let grid = create_grid_with_gaps(2, 2, &[1.0, 2.0, 3.0, 4.0], &[(1, 0), (5, 5)]);
        assert_eq!(grid, vec![Some(1.0), None, Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_scattered_points_deterministic() {
        let a = create_scattered_points(20, 10.0, 5.0, 42);
        let b = create_scattered_points(20, 10.0, 5.0, 42);
        assert_eq!(a, b);
        for &(x, y, z) in &a {
            assert!((0.0..10.0).contains(&x));
            assert!((0.0..5.0).contains(&y));
            assert!((0.0..100.0).contains(&z));
        }
        assert_ne!(a, create_scattered_points(20, 10.0, 5.0, 7));
    }
}
