//! Tabular export of a document directory.
//!
//! Document files are named `<code>_<company>_<title>_<timestamp>.txt`. This
//! module splits those names back into their fields and writes them as CSV
//! with the timestamp rendered as a date.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::download::filename::{DOCUMENT_EXTENSION, FIELD_SEPARATOR};

/// CSV header row, in column order.
pub const CATALOG_HEADER: [&str; 5] = ["code", "company_name", "title", "timestamp", "filename"];

/// Errors from catalog parsing and export.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A filename does not follow the document naming convention.
    #[error("'{filename}' is not a document filename: {reason}")]
    InvalidFilename {
        /// The offending filename.
        filename: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The timestamp field is not a `YYYYMMDD` date.
    #[error("'{filename}' has invalid timestamp '{timestamp}'")]
    InvalidTimestamp {
        /// The offending filename.
        filename: String,
        /// The timestamp field.
        timestamp: String,
    },

    /// Reading the directory or writing the export failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    fn invalid(filename: &str, reason: &'static str) -> Self {
        Self::InvalidFilename {
            filename: filename.to_string(),
            reason,
        }
    }
}

/// Fields recovered from one document filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilename {
    /// Issuer code.
    pub code: String,
    /// Company name.
    pub company_name: String,
    /// Document title.
    pub title: String,
    /// Raw `YYYYMMDD` timestamp field.
    pub timestamp: String,
    /// The original filename.
    pub filename: String,
}

/// One catalog row: a parsed filename plus its date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Fields from the filename.
    pub document: DocumentFilename,
    /// Parsed timestamp.
    pub date: NaiveDate,
}

/// Splits a document filename into its fields.
///
/// The code is everything before the first separator and the timestamp
/// everything after the last. The remainder splits at its first separator
/// into company name and title, so a title may contain separators but a
/// company name may not. [`document_file_name`] guarantees that layout.
///
/// [`document_file_name`]: crate::download::filename::document_file_name
///
/// # Errors
///
/// Returns [`CatalogError::InvalidFilename`] if the extension is wrong or
/// fewer than four fields are present.
pub fn parse_document_filename(filename: &str) -> Result<DocumentFilename, CatalogError> {
    let stem = filename
        .strip_suffix(DOCUMENT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(|| CatalogError::invalid(filename, "missing .txt extension"))?;

    let (code, rest) = stem
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| CatalogError::invalid(filename, "no field separator"))?;
    let (middle, timestamp) = rest
        .rsplit_once(FIELD_SEPARATOR)
        .ok_or_else(|| CatalogError::invalid(filename, "missing timestamp field"))?;
    let (company_name, title) = middle
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| CatalogError::invalid(filename, "missing title field"))?;

    if code.is_empty() {
        return Err(CatalogError::invalid(filename, "empty code field"));
    }

    Ok(DocumentFilename {
        code: code.to_string(),
        company_name: company_name.to_string(),
        title: title.to_string(),
        timestamp: timestamp.to_string(),
        filename: filename.to_string(),
    })
}

/// Parses a filename and its timestamp into a catalog entry.
///
/// # Errors
///
/// Returns [`CatalogError`] if the name or the timestamp does not parse.
pub fn catalog_entry(filename: &str) -> Result<CatalogEntry, CatalogError> {
    let document = parse_document_filename(filename)?;
    let date = NaiveDate::parse_from_str(&document.timestamp, "%Y%m%d").map_err(|_| {
        CatalogError::InvalidTimestamp {
            filename: filename.to_string(),
            timestamp: document.timestamp.clone(),
        }
    })?;
    Ok(CatalogEntry { document, date })
}

/// Catalogs every `.txt` file in `dir`, sorted by filename. Files whose name
/// does not parse are logged and skipped.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the directory cannot be read.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn catalog_directory(dir: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_document = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
        if is_document && !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        match catalog_entry(&name) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(error = %e, "skipping file"),
        }
    }
    debug!(entries = entries.len(), "catalogued directory");
    Ok(entries)
}

/// Writes `entries` as CSV with a header row.
///
/// # Errors
///
/// Returns the underlying IO error if writing fails.
pub fn write_catalog<W: Write>(mut writer: W, entries: &[CatalogEntry]) -> io::Result<()> {
    writeln!(writer, "{}", CATALOG_HEADER.join(","))?;
    for entry in entries {
        let date = entry.date.format("%Y-%m-%d").to_string();
        let row = [
            csv_field(&entry.document.code),
            csv_field(&entry.document.company_name),
            csv_field(&entry.document.title),
            csv_field(&date),
            csv_field(&entry.document.filename),
        ];
        writeln!(writer, "{}", row.join(","))?;
    }
    writer.flush()
}

/// Quotes a field if it contains a comma, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
