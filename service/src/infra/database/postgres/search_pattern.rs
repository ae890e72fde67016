//! [`SearchPattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// `ILIKE` pattern matching any text containing the searched substring.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct SearchPattern(String);

impl SearchPattern {
    /// Creates a new [`SearchPattern`] out of the given `input`.
    ///
    /// Wildcards of the `input` are escaped, so they match literally.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let mut pattern = String::with_capacity(input.len() + 2);
        pattern.push('%');
        for c in input.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}

#[cfg(test)]
mod spec {
    use super::SearchPattern;

    #[test]
    fn wraps_input() {
        assert_eq!(SearchPattern::new("ana").to_string(), "%ana%");
        assert_eq!(SearchPattern::new("").to_string(), "%%");
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(SearchPattern::new("50%").to_string(), r"%50\%%");
        assert_eq!(SearchPattern::new("a_b").to_string(), r"%a\_b%");
        assert_eq!(SearchPattern::new(r"c:\x").to_string(), r"%c:\\x%");
    }
}
