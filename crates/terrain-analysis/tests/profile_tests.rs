//! Tests for profile extraction along polylines.

use terrain_analysis::{extract_profile, GridGeometry, ScalarGrid};
use terrain_common::{Point3, Polyline};
use test_utils::{assert_approx_eq, assert_some_approx_eq, create_grid_with_gaps, create_plane_grid};

/// z = 5 + 2x - y on a 6 x 5 unit lattice.
fn plane_grid() -> ScalarGrid {
    let geometry = GridGeometry::new(6, 5, 0.0, 0.0, 1.0, 1.0).unwrap();
    ScalarGrid::from_values(geometry, &create_plane_grid(6, 5, 1.0, 5.0, 2.0, -1.0)).unwrap()
}

fn plane(x: f64, y: f64) -> f64 {
    5.0 + 2.0 * x - y
}

// =============================================================================
// Straight lines
// =============================================================================

#[test]
fn test_diagonal_line_crossings_counted() {
    let grid = plane_grid();
    let line = Polyline::from_xy(&[(0.3, 0.2), (4.6, 3.9)]);
    let profile = extract_profile(&grid, &line).unwrap();

    // 4 column lines + 3 row lines + 2 end points.
    assert_eq!(profile.len(), 9);
    assert_eq!(profile.t_min(), Some(0.0));
    assert_approx_eq!(profile.t_max().unwrap(), line.length(), 1e-12);
}

#[test]
fn test_stations_are_sorted_and_exact_on_plane() {
    let grid = plane_grid();
    let (x0, y0, x1, y1) = (0.3, 0.2, 4.6, 3.9);
    let line = Polyline::from_xy(&[(x0, y0), (x1, y1)]);
    let length = line.length();
    let profile = extract_profile(&grid, &line).unwrap();

    for pair in profile.pairs().windows(2) {
        assert!(pair[0].t <= pair[1].t);
    }
    for pair in profile.pairs() {
        let s = pair.t / length;
        let expected = plane(x0 + s * (x1 - x0), y0 + s * (y1 - y0));
        assert_some_approx_eq!(pair.z, expected, 1e-9);
    }
}

#[test]
fn test_line_through_vertices_merges_duplicate_stations() {
    let grid = plane_grid();
    // Crosses column and row lines simultaneously at (1,1), (2,2), (3,3).
    let line = Polyline::from_xy(&[(0.5, 0.5), (3.5, 3.5)]);
    let profile = extract_profile(&grid, &line).unwrap();
    assert_eq!(profile.len(), 5);
    assert_some_approx_eq!(profile.pairs()[2].z, plane(2.0, 2.0), 1e-9);
}

// =============================================================================
// Polylines
// =============================================================================

#[test]
fn test_multi_segment_stations_accumulate() {
    let grid = plane_grid();
    let line = Polyline::from_xy(&[(0.5, 0.5), (2.5, 0.5), (2.5, 3.5)]);
    let profile = extract_profile(&grid, &line).unwrap();

    assert_eq!(profile.t_start(), 0.0);
    assert_eq!(profile.t_end(), 5.0);
    // Segment 1 crosses x = 1, 2; the joint at t = 2; segment 2 crosses y = 1, 2, 3.
    let expected = [0.0, 0.5, 1.5, 2.0, 2.5, 3.5, 4.5, 5.0];
    assert_eq!(profile.len(), expected.len());
    for (pair, t) in profile.pairs().iter().zip(expected) {
        assert_approx_eq!(pair.t, t, 1e-12);
    }
    assert_some_approx_eq!(profile.pairs()[3].z, plane(2.5, 0.5), 1e-9);
    assert_some_approx_eq!(profile.pairs()[7].z, plane(2.5, 3.5), 1e-9);
}

#[test]
fn test_profile_keeps_polyline_and_range() {
    let grid = plane_grid();
    let line = Polyline::from_xy(&[(0.0, 4.0), (5.0, 4.0)]);
    let profile = extract_profile(&grid, &line).unwrap();
    assert_eq!(profile.polyline(), &line);
    assert_some_approx_eq!(profile.z_min(), plane(0.0, 4.0), 1e-9);
    assert_some_approx_eq!(profile.z_max(), plane(5.0, 4.0), 1e-9);
}

#[test]
fn test_single_vertex_profile() {
    let grid = plane_grid();
    let line = Polyline::new(vec![Point3::new(1.5, 1.5, 0.0)]);
    let profile = extract_profile(&grid, &line).unwrap();
    assert_eq!(profile.len(), 1);
    assert_some_approx_eq!(profile.pairs()[0].z, plane(1.5, 1.5), 1e-9);
}

// =============================================================================
// Missing data
// =============================================================================

#[test]
fn test_unset_samples_suppress_crossings() {
    let geometry = GridGeometry::new(4, 2, 0.0, 0.0, 1.0, 1.0).unwrap();
    let values = create_grid_with_gaps(4, 2, &[0.0; 8], &[(2, 0)]);
    let grid = ScalarGrid::from_options(geometry, values).unwrap();

    let line = Polyline::from_xy(&[(0.5, 0.5), (2.8, 0.5)]);
    let profile = extract_profile(&grid, &line).unwrap();
    // The crossing at x = 2 is dropped; the end point lies in a cell with
    // an unset corner and carries no value.
    assert_eq!(profile.len(), 3);
    assert_approx_eq!(profile.pairs()[1].t, 0.5, 1e-12);
    assert_approx_eq!(profile.pairs()[2].t, 2.3, 1e-12);
    assert_eq!(profile.pairs()[2].z, None);
    assert_eq!(profile.defined().count(), 2);
}

#[test]
fn test_line_outside_grid_has_only_undefined_end_points() {
    let grid = plane_grid();
    let line = Polyline::from_xy(&[(10.0, 10.0), (12.0, 11.0)]);
    let profile = extract_profile(&grid, &line).unwrap();
    assert_eq!(profile.len(), 2);
    assert!(profile.pairs().iter().all(|p| p.z.is_none()));
    assert_eq!(profile.z_min(), None);
}
