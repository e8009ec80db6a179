//! Reference-system tags.
//!
//! The terrain crates never transform coordinates. A reference system is an
//! opaque tag (e.g. `"EPSG:25832"`) that travels with a grid so writers can
//! label their output and so mismatched inputs can be detected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque coordinate reference system identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceSystem(String);

impl ReferenceSystem {
    /// Wrap an identifier exactly as given.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Tag for an EPSG code, e.g. `ReferenceSystem::epsg(4326)` -> `"EPSG:4326"`.
    pub fn epsg(code: u32) -> Self {
        Self(format!("EPSG:{}", code))
    }

    /// The identifier as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison (`"epsg:4326"` matches `"EPSG:4326"`).
    pub fn matches(&self, other: &ReferenceSystem) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for ReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReferenceSystem {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Check whether two optional tags are compatible.
///
/// Untagged data is compatible only with untagged data; tagged data must
/// match case-insensitively.
pub fn compatible(a: Option<&ReferenceSystem>, b: Option<&ReferenceSystem>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.matches(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_passes_through_unchanged() {
        let srs = ReferenceSystem::new("epsg:25832");
        assert_eq!(srs.as_str(), "epsg:25832");
        assert_eq!(srs.to_string(), "epsg:25832");
    }

    #[test]
    fn test_matches_ignores_case() {
        assert!(ReferenceSystem::new("epsg:4326").matches(&ReferenceSystem::epsg(4326)));
        assert!(!ReferenceSystem::epsg(4326).matches(&ReferenceSystem::epsg(3857)));
    }

    #[test]
    fn test_compatible() {
        let a = ReferenceSystem::epsg(25832);
        assert!(compatible(None, None));
        assert!(compatible(Some(&a), Some(&a.clone())));
        assert!(!compatible(Some(&a), None));
        assert!(!compatible(None, Some(&a)));
    }
}
