//! Year allow-list applied to discovered records.

use std::collections::BTreeSet;

/// Returns `true` iff the first four characters of `timestamp` equal one of
/// `years`. An empty allow-list admits nothing.
#[must_use]
pub fn admit<S: AsRef<str>>(timestamp: &str, years: &[S]) -> bool {
    timestamp
        .get(..4)
        .is_some_and(|year| years.iter().any(|allowed| allowed.as_ref() == year))
}

/// Admits records whose timestamp year is in a fixed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFilter {
    years: BTreeSet<String>,
}

impl DateFilter {
    /// Creates a filter admitting exactly `years`.
    pub fn new<I, S>(years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            years: years.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the record timestamp falls in an allowed year.
    #[must_use]
    pub fn admit(&self, timestamp: &str) -> bool {
        timestamp
            .get(..4)
            .is_some_and(|year| self.years.contains(year))
    }

    /// Returns the allowed years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.iter().map(String::as_str)
    }
}
