//! Filename derivation for downloaded documents.
//!
//! A document's file is `<code>_<companyName>_<title>_<timestamp>.txt` under the
//! output directory. The name is the on-disk identity of a document: if the
//! file exists, the document has already been retrieved. The catalog export
//! splits the same name back into its fields, so the layout must not change.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::search::DocumentRecord;

/// Extension of every document file.
pub const DOCUMENT_EXTENSION: &str = "txt";

/// Separator between filename fields.
pub const FIELD_SEPARATOR: char = '_';

/// Derives the filename for `record`.
///
/// Only the title may keep a [`FIELD_SEPARATOR`]; in the other fields it is
/// replaced so the name splits back into the same four fields.
#[must_use]
pub fn document_file_name(record: &DocumentRecord) -> String {
    format!(
        "{code}{sep}{name}{sep}{title}{sep}{timestamp}.{DOCUMENT_EXTENSION}",
        code = sanitize(&record.code, true),
        name = sanitize(&record.company_name, true),
        title = sanitize(&record.title, false),
        timestamp = sanitize(&record.timestamp, true),
        sep = FIELD_SEPARATOR,
    )
}

/// Derives the full target path for `record` under `output_dir`.
#[must_use]
pub fn document_path(output_dir: &Path, record: &DocumentRecord) -> PathBuf {
    output_dir.join(document_file_name(record))
}

/// Replaces characters that would escape the output directory or be rejected
/// by the filesystem, plus the field separator when `reserve_separator` is set.
/// Everything else is kept verbatim.
fn sanitize(value: &str, reserve_separator: bool) -> Cow<'_, str> {
    let replace = |c: char| is_path_unsafe(c) || (reserve_separator && c == FIELD_SEPARATOR);
    if value.chars().any(replace) {
        Cow::Owned(
            value
                .chars()
                .map(|c| if replace(c) { '-' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}

fn is_path_unsafe(c: char) -> bool {
    matches!(c, '/' | '\\') || c.is_control()
}
