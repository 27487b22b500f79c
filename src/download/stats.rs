//! Run-wide counters shared by every pipeline task.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe counters for one coordinator run.
///
/// Updated from concurrent paginator and document tasks; read once at the end
/// through [`RunStats::snapshot`].
#[derive(Debug, Default)]
pub struct RunStats {
    pages: AtomicUsize,
    records: AtomicUsize,
    filtered_out: AtomicUsize,
    extraction_failures: AtomicUsize,
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Result pages fetched.
    pub pages: usize,
    /// Records extracted from result pages.
    pub records: usize,
    /// Records rejected by the date filter.
    pub filtered_out: usize,
    /// Result blocks or documents whose markup could not be parsed.
    pub extraction_failures: usize,
    /// Documents fetched and written.
    pub downloaded: usize,
    /// Documents skipped because the file existed or was already in flight.
    pub skipped: usize,
    /// Documents whose fetch, extraction, or write failed.
    pub failed: usize,
}

impl RunStats {
    /// Creates a stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages: self.pages.load(Ordering::SeqCst),
            records: self.records.load(Ordering::SeqCst),
            filtered_out: self.filtered_out.load(Ordering::SeqCst),
            extraction_failures: self.extraction_failures.load(Ordering::SeqCst),
            downloaded: self.downloaded.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn record_page(&self, records: usize) {
        self.pages.fetch_add(1, Ordering::SeqCst);
        self.records.fetch_add(records, Ordering::SeqCst);
    }

    pub(crate) fn increment_filtered_out(&self) {
        self.filtered_out.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_extraction_failures(&self) {
        self.extraction_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_downloaded(&self) {
        self.downloaded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}
