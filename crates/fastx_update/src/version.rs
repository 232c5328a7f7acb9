//! Dotted-numeric release version comparison.
//!
//! Unlike [`fastx_core::Version`] (a strict `major.minor.patch` triple for
//! plugin metadata), release tags are compared component-wise with missing
//! trailing components treated as zero, per spec.

/// A release version parsed as a sequence of numeric components, with a
/// leading `v` stripped before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion(Vec<u64>);

impl ReleaseVersion {
    /// Parses `raw`, stripping a leading `v`/`V` and splitting on `.`.
    /// Returns `None` if any component is not purely numeric.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return None;
        }
        let mut components = Vec::new();
        for part in trimmed.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            components.push(part.parse().ok()?);
        }
        Some(Self(components))
    }

    /// Compares `self` against `other`, treating missing trailing
    /// components as zero. Returns `true` iff `other` is strictly greater.
    #[must_use]
    pub fn is_older_than(&self, other: &Self) -> bool {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            if a != b {
                return a < b;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_v() {
        assert_eq!(
            ReleaseVersion::parse("v1.2.3"),
            ReleaseVersion::parse("1.2.3")
        );
    }

    #[test]
    fn missing_components_treated_as_zero() {
        let short = ReleaseVersion::parse("1.2").unwrap();
        let long = ReleaseVersion::parse("1.2.0").unwrap();
        assert!(!short.is_older_than(&long));
        assert!(!long.is_older_than(&short));
    }

    #[test]
    fn detects_strictly_greater() {
        let old = ReleaseVersion::parse("1.2.3").unwrap();
        let new = ReleaseVersion::parse("1.3.0").unwrap();
        assert!(old.is_older_than(&new));
        assert!(!new.is_older_than(&old));
    }

    #[test]
    fn rejects_non_numeric_component() {
        assert!(ReleaseVersion::parse("1.2.3-beta").is_none());
    }
}
