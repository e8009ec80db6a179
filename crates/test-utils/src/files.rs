//! Temporary input files for command-line tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// Write samples as whitespace-separated `x y z` lines to a temporary file.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_xyz_file(points: &[(f64, f64, f64)]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "# x y z")?;
    for (x, y, z) in points {
        writeln!(file, "{} {} {}", x, y, z)?;
    }
    file.flush()?;
    Ok(file)
}

/// Write arbitrary text to a temporary file.
pub fn write_temp_file(contents: &str) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
