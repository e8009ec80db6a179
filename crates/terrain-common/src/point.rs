//! Point and polyline contracts exchanged with readers and writers.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// A 3-D sample position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar (x/y) distance, ignoring z.
    pub fn distance_xy(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

/// An ordered sequence of vertices. Only x/y matter for planar operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    vertices: Vec<Point3>,
}

impl Polyline {
    pub fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }

    /// Build a planar polyline from (x, y) pairs; z is set to 0.
    pub fn from_xy(coords: &[(f64, f64)]) -> Self {
        Self {
            vertices: coords
                .iter()
                .map(|&(x, y)| Point3::new(x, y, 0.0))
                .collect(),
        }
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate over consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&Point3, &Point3)> {
        self.vertices.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Planar length (sum of segment lengths).
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance_xy(b)).sum()
    }

    /// Planar envelope of the vertices, `None` for an empty polyline.
    pub fn envelope(&self) -> Option<BoundingBox> {
        let first = self.vertices.first()?;
        let init = BoundingBox::new(first.x, first.y, first.x, first.y);
        Some(self.vertices.iter().fold(init, |bb, p| {
            BoundingBox::new(
                bb.min_x.min(p.x),
                bb.min_y.min(p.y),
                bb.max_x.max(p.x),
                bb.max_y.max(p.y),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_ignores_z() {
        let a = Point3::new(0.0, 0.0, 100.0);
        let b = Point3::new(3.0, 4.0, -50.0);
        assert_eq!(a.distance_xy(&b), 5.0);
    }

    #[test]
    fn test_polyline_length() {
        let line = Polyline::from_xy(&[(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
        assert_eq!(line.len(), 3);
        assert_eq!(line.segments().count(), 2);
        assert!((line.length() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_envelope() {
        let line = Polyline::from_xy(&[(1.0, 5.0), (-2.0, 3.0), (4.0, 4.0)]);
        assert_eq!(
            line.envelope(),
            Some(BoundingBox::new(-2.0, 3.0, 4.0, 5.0))
        );
        assert_eq!(Polyline::default().envelope(), None);
    }
}
