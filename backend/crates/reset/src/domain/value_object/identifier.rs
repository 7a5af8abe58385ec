//! Account Identifier Value Object
//!
//! The identifier callers present when asking for a reset, normalized so
//! that lookups, rate-limit keys and stored accounts all agree on one form.

use std::fmt;

/// Longest display label derived from an identifier's local part
const MAX_DISPLAY_LABEL: usize = 60;

/// Normalized account identifier (trimmed, lowercased, case-insensitive).
///
/// Construction via [`Identifier::normalize`] is the only way to obtain one,
/// so an `Identifier` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Normalize a raw caller-supplied identifier.
    ///
    /// Returns `None` for empty or whitespace-only input, which the caller
    /// must treat as "missing identifier".
    pub fn normalize(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display label for a provisioned account: the local part of the
    /// identifier, truncated, falling back to "User".
    pub fn display_label(&self) -> String {
        let local = self.0.split('@').next().unwrap_or("");
        if local.is_empty() {
            "User".to_string()
        } else {
            local.chars().take(MAX_DISPLAY_LABEL).collect()
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let id = Identifier::normalize("  User@Example.COM ").unwrap();
        assert_eq!(id.as_str(), "user@example.com");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(Identifier::normalize("").is_none());
        assert!(Identifier::normalize("   \t ").is_none());
    }

    #[test]
    fn test_display_label() {
        let id = Identifier::normalize("jane.doe@example.com").unwrap();
        assert_eq!(id.display_label(), "jane.doe");

        let id = Identifier::normalize("@example.com").unwrap();
        assert_eq!(id.display_label(), "User");

        let long_local = format!("{}@example.com", "a".repeat(80));
        let id = Identifier::normalize(&long_local).unwrap();
        assert_eq!(id.display_label().len(), 60);
    }
}
