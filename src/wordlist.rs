//! Query-term loading from inline lists and CSV word lists.
//!
//! A word list is a CSV file with a header row. The column whose header matches
//! the selected [`SearchField`] (by code such as `S1`, or by label such as
//! `name`) supplies one query term per row.

use std::fmt;
use std::fs;
use std::mem::take;
use std::path::Path;

use tracing::{debug, instrument};

use crate::config::{ConfigError, SearchField};

/// One search input driving one independent paginated search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryTerm(String);

impl QueryTerm {
    /// Wraps a term, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_string())
    }

    /// Returns the term text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a comma-separated term list, dropping empty entries.
#[must_use]
pub fn parse_inline_terms(value: &str) -> Vec<QueryTerm> {
    value
        .split(',')
        .map(QueryTerm::new)
        .filter(|t| !t.as_str().is_empty())
        .collect()
}

/// Resolves the query terms for a run. A word list takes precedence over
/// inline terms.
///
/// # Errors
///
/// Returns a word list error if the file cannot be read or lacks the column,
/// and [`ConfigError::NoQueryTerms`] if no term remains.
pub fn resolve_terms(
    inline: Option<&str>,
    wordlist: Option<&Path>,
    field: SearchField,
) -> Result<Vec<QueryTerm>, ConfigError> {
    let terms = match (wordlist, inline) {
        (Some(path), _) => load_wordlist(path, field)?,
        (None, Some(inline)) => parse_inline_terms(inline),
        (None, None) => Vec::new(),
    };
    if terms.is_empty() {
        return Err(ConfigError::NoQueryTerms);
    }
    Ok(terms)
}

/// Reads the terms for `field` from a CSV word list.
///
/// # Errors
///
/// Returns [`ConfigError::WordlistIo`] if the file cannot be read and
/// [`ConfigError::WordlistColumnMissing`] if no header matches `field`.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_wordlist(path: &Path, field: SearchField) -> Result<Vec<QueryTerm>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::WordlistIo {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = parse_rows(&raw).into_iter();
    let header = rows.next().unwrap_or_default();
    let Some(column) = header.iter().position(|h| {
        let h = h.trim();
        h.eq_ignore_ascii_case(field.code()) || h.eq_ignore_ascii_case(field.label())
    }) else {
        return Err(ConfigError::WordlistColumnMissing {
            path: path.to_path_buf(),
            column: field.code().to_string(),
        });
    };

    let terms: Vec<QueryTerm> = rows
        .filter_map(|row| row.get(column).map(QueryTerm::new))
        .filter(|t| !t.as_str().is_empty())
        .collect();

    debug!(terms = terms.len(), column, "loaded word list");
    Ok(terms)
}

/// Minimal CSV parser: double-quote escapes, CRLF tolerant, blank lines dropped.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }

    rows
}
