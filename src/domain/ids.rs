//! Canonical symbol identifier.

use std::fmt;

/// Canonical `BASE/QUOTE` symbol, venue-independent.
///
/// The inner String is private so all construction goes through the defined
/// constructors, which normalize case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from an already-canonical `BASE/QUOTE` string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_uppercase())
    }

    /// Build the canonical symbol from a venue catalog's base and quote
    /// currency fields.
    pub fn from_parts(base: &str, quote: &str) -> Self {
        Self(format!(
            "{}/{}",
            base.trim().to_uppercase(),
            quote.trim().to_uppercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
