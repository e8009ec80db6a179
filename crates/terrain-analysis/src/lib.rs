//! Grid-based terrain analysis.
//!
//! This crate provides the numerical core for working with regular,
//! axis-aligned elevation rasters:
//!
//! - **Gridding**: scattered samples to a grid with selectable kernels
//! - **Profiles**: elevation along a polyline
//! - **Gradients**: slope, aspect and curvature from 3x3 stencils
//! - **Flood fill**: barrier-bounded connected regions
//! - **Extrema**: local and global minima/maxima as point features
//! - **Difference**: cell-wise subtraction of co-registered grids
//!
//! # Architecture
//!
//! ```text
//! Vec<Point3> ──► PointGridder::grid ──► ScalarGrid
//!                                            │
//!        ┌──────────────┬──────────────┬─────┴────────┬─────────────┐
//!        ▼              ▼              ▼              ▼             ▼
//!  extract_profile  GradientOperator  flood_fill  ExtremumDetector  difference
//!        │              │              │              │             │
//!        ▼              ▼              ▼              ▼             ▼
//!     Profile       ScalarGrid     ScalarGrid    Vec<AttrFeature> ScalarGrid
//! ```
//!
//! Engines never modify their inputs; each returns a newly allocated result.
//!
//! # Example
//!
//! ```
//! use terrain_analysis::{
//!     GradientMode, GradientOperator, GridGeometry, PointGridder, WeightFunction,
//! };
//! use terrain_common::Point3;
//!
//! let geometry = GridGeometry::new(3, 1, 0.0, 0.0, 5.0, 5.0)?;
//! let gridder = PointGridder::with_radius(geometry, 11.0, WeightFunction::InverseDistance)?;
//! let grid = gridder.grid(&[Point3::new(0.0, 0.0, 10.0), Point3::new(10.0, 0.0, 20.0)])?;
//! assert!((grid.get(0, 1)?.unwrap() - 15.0).abs() < 1e-9);
//!
//! let slope = GradientOperator::new(GradientMode::SlopePercent).transform(&grid)?;
//! assert_eq!(slope.theme(), "Slope_[%]");
//! # Ok::<(), terrain_analysis::TerrainError>(())
//! ```

pub mod config;
pub mod difference;
pub mod error;
pub mod extrema;
pub mod flood_fill;
pub mod geometry;
pub mod gradient;
pub mod grid;
pub mod gridding;
pub mod profile;

// Re-export commonly used types at crate root
pub use config::{GradientConfig, GriddingConfig};
pub use difference::difference;
pub use error::{Result, TerrainError};
pub use extrema::{AttrFeature, ExtremumDetector, ExtremumKind, ExtremumMode, FeatureAttribute};
pub use flood_fill::flood_fill;
pub use geometry::{GridGeometry, GridInterpretation};
pub use gradient::{
    aspect_category_4, aspect_category_8, aspect_radians, Derivative, DifferenceMethod,
    GradientMode, GradientOperator, Neighborhood, SurfaceFit, FLAT_ASPECT,
};
pub use grid::{GridSummary, ScalarGrid};
pub use gridding::{PointGridder, WeightFunction};
pub use profile::{extract_profile, Profile, TzPair};
