//! JSON and CSV writers for engine results.

use anyhow::Result;
use std::io::Write;

use terrain_analysis::{AttrFeature, GridSummary, Profile};
use terrain_common::Point3;

/// Write a grid summary as pretty-printed JSON.
pub fn write_summary<W: Write>(out: &mut W, summary: &GridSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)?;
    Ok(())
}

/// Write points as `X,Y,Z` records.
pub fn write_points<W: Write>(out: &mut W, points: &[Point3]) -> Result<()> {
    writeln!(out, "X,Y,Z")?;
    for p in points {
        writeln!(out, "{},{},{}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Write features as `X,Y,Z,<ATTR>` records.
///
/// The attribute column is named after the first feature's attribute.
pub fn write_features<W: Write>(out: &mut W, features: &[AttrFeature]) -> Result<()> {
    let name = features.first().map_or("ATTR", |f| f.attribute.name());
    writeln!(out, "X,Y,Z,{}", name)?;
    for f in features {
        writeln!(
            out,
            "{},{},{},{}",
            f.point.x,
            f.point.y,
            f.point.z,
            f.attribute.value()
        )?;
    }
    Ok(())
}

/// Write profile stations as `T,Z` records; undefined elevations are empty.
pub fn write_profile<W: Write>(out: &mut W, profile: &Profile) -> Result<()> {
    writeln!(out, "T,Z")?;
    for pair in profile.pairs() {
        match pair.z {
            Some(z) => writeln!(out, "{},{}", pair.t, z)?,
            None => writeln!(out, "{},", pair.t)?,
        }
    }
    Ok(())
}
