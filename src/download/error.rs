//! Error types for page and document retrieval.
//!
//! [`FetchError`] covers network and HTTP failures, [`ExtractionError`] covers
//! markup that lacks an expected substructure, and [`DownloadError`] is the
//! failure of one document task. None of them abort a run: the affected unit
//! (one page, one record, one document) is logged and skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Network or HTTP failure while retrieving a page or document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, classifying timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

/// Expected markup substructure was missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// A result block lacked one of its fields.
    #[error("result block at offset {offset} has no {field}")]
    MissingField {
        /// Which field could not be located.
        field: &'static str,
        /// Byte offset of the block's anchor in the page.
        offset: usize,
    },

    /// The document text has no "DD Month, YYYY" date anchor.
    #[error("no date anchor (DD Month, YYYY) in document text")]
    MissingDateAnchor,

    /// The document text has no trailer marker after the date anchor.
    #[error("no trailer marker after the date anchor")]
    MissingTrailer,
}

impl ExtractionError {
    /// Creates a missing-field error for the block anchored at `offset`.
    #[must_use]
    pub fn missing(field: &'static str, offset: usize) -> Self {
        Self::MissingField { field, offset }
    }
}

/// Failure of one document download task.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The document page could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The document body could not be located; nothing is written.
    #[error("failed to extract body of {url}: {source}")]
    Extraction {
        /// Document link.
        url: String,
        /// What was missing.
        #[source]
        source: ExtractionError,
    },

    /// Writing the document file failed.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an extraction error for the document at `url`.
    pub fn extraction(url: impl Into<String>, source: ExtractionError) -> Self {
        Self::Extraction {
            url: url.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_http_status_display() {
        let error = FetchError::http_status("https://example.com/AdvancedSearch.aspx", 503);
        let msg = error.to_string();
        assert!(msg.contains("503"), "Expected '503' in: {msg}");
        assert!(msg.contains("AdvancedSearch.aspx"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_fetch_error_timeout_display() {
        let msg = FetchError::timeout("https://example.com/doc").to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("https://example.com/doc"));
    }

    #[test]
    fn test_extraction_error_missing_field_display() {
        let msg = ExtractionError::missing("title", 1234).to_string();
        assert!(msg.contains("title"), "got: {msg}");
        assert!(msg.contains("1234"), "got: {msg}");
    }

    #[test]
    fn test_download_error_extraction_includes_link() {
        let error =
            DownloadError::extraction("https://example.com/a/", ExtractionError::MissingTrailer);
        let msg = error.to_string();
        assert!(msg.contains("https://example.com/a/"), "got: {msg}");
        assert!(msg.contains("trailer"), "got: {msg}");
    }

    #[test]
    fn test_download_error_fetch_is_transparent() {
        let error = DownloadError::from(FetchError::http_status("https://example.com/a/", 404));
        assert_eq!(error.to_string(), "HTTP 404 fetching https://example.com/a/");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/docs/ABC.txt"), io_error);
        assert!(error.to_string().contains("/tmp/docs/ABC.txt"));
    }
}
