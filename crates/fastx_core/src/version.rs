//! Dotted, component-wise version comparison.
//!
//! Mirrors [`polaris_system::plugin::Version`] in shape (`major.minor.patch`,
//! `Display` as `x.y.z`), but parses from plugin-supplied strings rather than
//! being a compile-time constant, and tolerates a leading `v` and missing
//! trailing components (both padded with zero) since it must also compare
//! release-index tags such as `v0.1.10`.

use core::cmp::Ordering;
use core::fmt;

/// A semantic-version-like triple used both for strict plugin metadata
/// (`PluginInfo.version`, which must match `^\d+\.\d+\.\d+$`) and for the
/// looser release-index comparisons the Update Manager performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    /// Breaking changes.
    pub major: u64,
    /// Backwards-compatible additions.
    pub minor: u64,
    /// Backwards-compatible bug fixes.
    pub patch: u64,
}

/// Error returned when a string cannot be parsed as a [`Version`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version string {0:?}")]
pub struct VersionParseError(pub String);

impl Version {
    /// Creates a new [`Version`].
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a version string, requiring an exact `x.y.z` shape (no missing
    /// components, no leading `v`). Used for `PluginInfo.version` validation.
    pub fn parse_strict(value: &str) -> Result<Self, VersionParseError> {
        let parts: Vec<&str> = value.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError(value.to_string()));
        }
        let mut components = [0u64; 3];
        for (slot, part) in components.iter_mut().zip(parts.iter()) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError(value.to_string()));
            }
            *slot = part
                .parse()
                .map_err(|_| VersionParseError(value.to_string()))?;
        }
        Ok(Self::new(components[0], components[1], components[2]))
    }

    /// Parses a version string leniently: strips a leading `v`, pads missing
    /// trailing components with zero. Used to compare release-index tags.
    pub fn parse_lenient(value: &str) -> Result<Self, VersionParseError> {
        let stripped = value.strip_prefix('v').unwrap_or(value);
        let mut components = [0u64; 3];
        let mut seen = 0;
        for (idx, part) in stripped.split('.').enumerate() {
            if idx >= 3 {
                break;
            }
            // Tolerate trailing non-numeric suffixes like "1.2.3-beta" by
            // stopping at the first non-digit byte.
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(VersionParseError(value.to_string()));
            }
            components[idx] = digits
                .parse()
                .map_err(|_| VersionParseError(value.to_string()))?;
            seen += 1;
        }
        if seen == 0 {
            return Err(VersionParseError(value.to_string()));
        }
        Ok(Self::new(components[0], components[1], components[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parses_exact_triple() {
        assert_eq!(Version::parse_strict("1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn strict_rejects_missing_components() {
        assert!(Version::parse_strict("1.0").is_err());
        assert!(Version::parse_strict("1").is_err());
    }

    #[test]
    fn strict_rejects_non_numeric() {
        assert!(Version::parse_strict("1.x.0").is_err());
    }

    #[test]
    fn lenient_strips_leading_v() {
        assert_eq!(Version::parse_lenient("v0.1.10").unwrap(), Version::new(0, 1, 10));
    }

    #[test]
    fn lenient_pads_missing_components() {
        assert_eq!(Version::parse_lenient("1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse_lenient("1.2").unwrap(), Version::new(1, 2, 0));
    }

    #[test]
    fn ordering_is_component_wise() {
        assert!(Version::new(0, 1, 0) < Version::new(0, 1, 10));
        assert!(Version::new(0, 1, 10) < Version::new(0, 2, 0));
        assert!(Version::new(0, 9, 9) < Version::new(1, 0, 0));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let v = Version::new(3, 4, 5);
        assert_eq!(Version::parse_strict(&v.to_string()).unwrap(), v);
    }
}
