//! Stable, validated identifiers for menu nodes, actions, and plugins.

use core::fmt;

/// A short ASCII slug, globally unique across menu nodes and actions within
/// one process.
///
/// Valid IDs match `[A-Za-z0-9_-]+`. IDs are immutable once constructed and
/// own their backing string, since (unlike compile-time plugin identifiers)
/// they are parsed from plugin-supplied data at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Box<str>);

/// Error returned when a candidate string is not a valid [`Id`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The candidate string was empty.
    #[error("id must not be empty")]
    Empty,
    /// The candidate string contained a character outside `[A-Za-z0-9_-]`.
    #[error("id {0:?} contains an invalid character; only [A-Za-z0-9_-] are allowed")]
    InvalidCharacter(String),
}

impl Id {
    /// Validates and constructs an [`Id`] from any string-like value.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(IdError::InvalidCharacter(value));
        }
        Ok(Self(value.into_boxed_str()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::borrow::Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Id {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Id {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_underscore_dash() {
        assert!(Id::new("alpha_hello-1").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Id::new(""), Err(IdError::Empty));
    }

    #[test]
    fn rejects_invalid_character() {
        assert!(matches!(
            Id::new("alpha hello"),
            Err(IdError::InvalidCharacter(_))
        ));
        assert!(matches!(Id::new("a/b"), Err(IdError::InvalidCharacter(_))));
    }

    #[test]
    fn display_matches_source() {
        let id = Id::new("main_menu").unwrap();
        assert_eq!(id.to_string(), "main_menu");
        assert_eq!(id.as_str(), "main_menu");
    }
}
