//! Sequential pagination for one query term.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::date_filter::DateFilter;
use super::extractor::RecordExtractor;
use super::fetcher::PageSource;
use super::record::CompanyDocumentIndex;
use crate::config::SearchConfig;
use crate::download::{DownloadScheduler, FetchError, RunStats};
use crate::wordlist::QueryTerm;

/// Outcome of paginating one query term.
#[derive(Debug)]
pub struct TermReport {
    /// The term searched.
    pub term: QueryTerm,
    /// Result pages fetched, including the terminating empty page.
    pub pages_fetched: u32,
    /// Every admitted record, grouped by issuer code.
    pub index: CompanyDocumentIndex,
    /// Set when a page fetch failed and pagination stopped early.
    pub error: Option<FetchError>,
}

impl TermReport {
    /// Returns `true` if pagination ran to the terminating empty page.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.error.is_none()
    }
}

/// Drives page fetch, record extraction and date filtering for one term,
/// handing each page's admitted records to a [`DownloadScheduler`].
///
/// Pages are requested strictly in order; page `n + 1` is only requested
/// after page `n` has been extracted. Downloads scheduled for page `n` may
/// still be running when page `n + 1` is fetched.
#[derive(Clone)]
pub struct SearchPaginator {
    pages: Arc<dyn PageSource>,
    extractor: Arc<dyn RecordExtractor>,
    filter: DateFilter,
    stats: Arc<RunStats>,
}

impl std::fmt::Debug for SearchPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPaginator")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl SearchPaginator {
    /// Creates a paginator.
    #[must_use]
    pub fn new(
        pages: Arc<dyn PageSource>,
        extractor: Arc<dyn RecordExtractor>,
        filter: DateFilter,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            pages,
            extractor,
            filter,
            stats,
        }
    }

    /// Paginates `term` from page 1 until a page has no result anchors.
    ///
    /// A page whose records are all rejected by the date filter does not end
    /// pagination. A page fetch failure does, and is returned in the report.
    #[instrument(skip(self, term, base, scheduler), fields(term = %term))]
    pub async fn run(
        &self,
        term: &QueryTerm,
        base: &SearchConfig,
        scheduler: &mut DownloadScheduler,
    ) -> TermReport {
        let mut config = base.for_term(term.as_str());
        let mut report = TermReport {
            term: term.clone(),
            pages_fetched: 0,
            index: CompanyDocumentIndex::new(),
            error: None,
        };

        loop {
            let markup = match self.pages.fetch_page(&config).await {
                Ok(markup) => markup,
                Err(e) => {
                    warn!(page = config.page, error = %e, "result page fetch failed; stopping term");
                    report.error = Some(e);
                    break;
                }
            };
            report.pages_fetched += 1;

            let page = self.extractor.extract(&markup);
            self.stats.record_page(page.records.len());
            for failure in &page.failures {
                warn!(page = config.page, error = %failure, "skipping malformed result block");
                self.stats.increment_extraction_failures();
            }

            if page.is_last() {
                debug!(page = config.page, "no results on page; pagination finished");
                break;
            }

            let mut admitted = CompanyDocumentIndex::new();
            for record in page.records {
                if self.filter.admit(&record.timestamp) {
                    admitted.push(record);
                } else {
                    self.stats.increment_filtered_out();
                }
            }
            debug!(
                page = config.page,
                anchors = page.anchors,
                admitted = admitted.len(),
                "result page processed"
            );

            scheduler.schedule(&admitted).await;
            report.index.extend(admitted);
            config.page += 1;
        }

        info!(
            pages = report.pages_fetched,
            records = report.index.len(),
            companies = report.index.codes().count(),
            "term pagination finished"
        );
        report
    }
}
