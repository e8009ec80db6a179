//! Common geometry contracts shared across the terrain workspace.

pub mod bbox;
pub mod crs;
pub mod point;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::ReferenceSystem;
pub use point::{Point3, Polyline};
