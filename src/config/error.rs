//! Error types for configuration assembly.
//!
//! Every variant is fatal at startup: configuration is validated before any
//! network work begins.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither inline terms nor a word list produced a query term.
    #[error(
        "no query terms provided\n  Suggestion: pass terms with --name or a CSV word list with --wordlist"
    )]
    NoQueryTerms,

    /// A category was supplied for an article type that does not support one.
    #[error("category '{category}' is only valid for news searches")]
    CategoryRequiresNews {
        /// The rejected category.
        category: String,
    },

    /// Unknown article type label.
    #[error("unknown article type '{value}': expected 'ann' or 'news'")]
    UnknownArticleType {
        /// The rejected value.
        value: String,
    },

    /// Unknown search index field label.
    #[error("unknown search field '{value}': expected S1/name, S2/epic or S3/sedol")]
    UnknownSearchField {
        /// The rejected value.
        value: String,
    },

    /// Outer pool size outside the accepted range.
    #[error("invalid thread count {value}: must be between {min} and {max}")]
    InvalidThreads {
        /// The rejected value.
        value: usize,
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound.
        max: usize,
    },

    /// HTTP timeout outside the accepted range.
    #[error("invalid {field} {value}s: must be between 1 and 3600 seconds")]
    InvalidTimeout {
        /// Name of the timeout setting.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },

    /// Proxy address was rejected by the HTTP client.
    #[error("invalid proxy address '{value}': {reason}")]
    InvalidProxy {
        /// The rejected proxy address.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Search endpoint could not be parsed as a URL.
    #[error("invalid search endpoint '{value}': {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The filter-year allow-list is empty, so every record would be rejected.
    #[error("filter year list is empty\n  Suggestion: pass at least one year with --years")]
    EmptyFilterYears,

    /// A filter year is not a four-digit year.
    #[error("invalid filter year '{value}': expected four digits such as 2009")]
    InvalidFilterYear {
        /// The rejected value.
        value: String,
    },

    /// The word list file could not be read.
    #[error("failed to read word list {path}: {source}")]
    WordlistIo {
        /// Word list path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The word list has no column for the selected search field.
    #[error("word list {path} has no '{column}' column")]
    WordlistColumnMissing {
        /// Word list path.
        path: PathBuf,
        /// Column header that was expected.
        column: String,
    },

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigFileIo {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contains an invalid line.
    #[error("invalid config file {path} line {line}: {reason}")]
    ConfigFileSyntax {
        /// Config file path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a config file syntax error.
    pub fn syntax(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::ConfigFileSyntax {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
