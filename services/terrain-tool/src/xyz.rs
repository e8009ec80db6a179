//! Reader for plain-text XYZ sample files.
//!
//! One sample per line, `x y z` separated by whitespace and/or commas.
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use terrain_common::Point3;

/// Parse XYZ text into points.
pub fn parse_xyz(text: &str) -> Result<Vec<Point3>> {
    let mut points = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 3 {
            bail!(
                "line {}: expected 3 values (x y z), found {}",
                number + 1,
                fields.len()
            );
        }

        let mut coords = [0.0; 3];
        for (slot, field) in coords.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .with_context(|| format!("line {}: invalid number '{}'", number + 1, field))?;
        }
        points.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    Ok(points)
}

/// Read an XYZ file.
pub fn read_xyz(path: &Path) -> Result<Vec<Point3>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read samples from {}", path.display()))?;
    let points = parse_xyz(&text).with_context(|| format!("In {}", path.display()))?;
    tracing::debug!(path = %path.display(), samples = points.len(), "Read XYZ samples");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_separators() {
        let text = "# header\n\n1 2 3\n4,5,6\n 7.5 ,\t8e1 , -9 \n";
        let points = parse_xyz(text).unwrap();
        assert_eq!(
            points,
            vec![
                Point3::new(1.0, 2.0, 3.0),
                Point3::new(4.0, 5.0, 6.0),
                Point3::new(7.5, 80.0, -9.0),
            ]
        );
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_xyz("1 2 3\n1 2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_xyz("1 two 3\n").unwrap_err();
        assert!(err.to_string().contains("'two'"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_xyz("# nothing\n").unwrap().is_empty());
    }

    #[test]
    fn test_read_file() {
        let file = test_utils::write_xyz_file(&[(0.0, 0.0, 1.0), (2.0, 3.0, 4.5)]).unwrap();
        let points = read_xyz(file.path()).unwrap();
        assert_eq!(points[1], Point3::new(2.0, 3.0, 4.5));
    }
}
