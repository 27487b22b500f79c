//! Document metadata discovered on result pages.

use std::collections::BTreeMap;

/// One disclosure entry scraped from a result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Issuer code; groups records in a [`CompanyDocumentIndex`].
    pub code: String,
    /// Company name with any parenthetical suffix removed.
    pub company_name: String,
    /// Absolute document URL.
    pub link: String,
    /// Document title.
    pub title: String,
    /// `YYYYMMDD`, sliced from the link path.
    pub timestamp: String,
}

/// Records grouped by issuer code, each group in discovery order.
///
/// Groups only grow. Duplicate records are kept; the download step is what
/// turns them into at most one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDocumentIndex {
    entries: BTreeMap<String, Vec<DocumentRecord>>,
}

impl CompanyDocumentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` to its issuer's group.
    pub fn push(&mut self, record: DocumentRecord) {
        self.entries
            .entry(record.code.clone())
            .or_default()
            .push(record);
    }

    /// Appends every group of `other`, preserving order within each group.
    pub fn extend(&mut self, other: CompanyDocumentIndex) {
        for (code, records) in other.entries {
            self.entries.entry(code).or_default().extend(records);
        }
    }

    /// Returns the records for `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&[DocumentRecord]> {
        self.entries.get(code).map(Vec::as_slice)
    }

    /// Returns the total number of records across all codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` if no records have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the issuer codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(code, records)` groups.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocumentRecord])> {
        self.entries
            .iter()
            .map(|(code, records)| (code.as_str(), records.as_slice()))
    }

    /// Iterates over every record, group by group.
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.entries.values().flatten()
    }
}

impl FromIterator<DocumentRecord> for CompanyDocumentIndex {
    fn from_iter<I: IntoIterator<Item = DocumentRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.push(record);
        }
        index
    }
}
