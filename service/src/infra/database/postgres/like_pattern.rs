//! [`LikePattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// SQL pattern for `LIKE`/`ILIKE` matching.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] matching any string containing the
    /// given `fragment` literally.
    #[must_use]
    pub fn contains(fragment: &str) -> Self {
        let mut pattern = String::with_capacity(fragment.len() + 2);
        pattern.push('%');
        for c in fragment.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}
