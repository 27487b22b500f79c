//! Fan-out of one search-and-download pipeline per query term.
//!
//! # Concurrency Model
//!
//! - The outer pool is a semaphore sized by the configured thread count
//! - A permit is acquired before each term's task is spawned
//! - Each task owns its own [`SearchConfig`] copy and [`DownloadScheduler`]
//! - The only state shared between terms is the run counters and the set of
//!   in-flight document paths

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashSet;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::config::{MAX_THREADS, MIN_THREADS, RunConfig, SearchConfig};
use crate::download::{
    ClientSettings, ContentFetcher, DownloadScheduler, HttpClient, RunStats, StatsSnapshot,
};
use crate::search::{
    AnchorRecordExtractor, DateFilter, PageFetcher, PageSource, RecordExtractor, SearchPaginator,
};
use crate::wordlist::QueryTerm;

/// Error type for coordinator setup and scheduling.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// Invalid thread count provided.
    #[error("invalid thread count {value}: must be between {MIN_THREADS} and {MAX_THREADS}")]
    InvalidThreads {
        /// The invalid value that was provided.
        value: usize,
    },

    /// An HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Result of a coordinator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of query terms dispatched.
    pub terms: usize,
    /// Terms whose pagination stopped on a fetch error or whose task panicked.
    pub failed_terms: Vec<QueryTerm>,
    /// Admitted records across all terms, duplicates included.
    pub records_discovered: usize,
    /// Final counter values.
    pub stats: StatsSnapshot,
}

/// Runs a [`SearchPaginator`] and [`DownloadScheduler`] per query term on a
/// bounded pool.
pub struct QueryCoordinator {
    semaphore: Arc<Semaphore>,
    threads: usize,
    pages: Arc<dyn PageSource>,
    extractor: Arc<dyn RecordExtractor>,
    filter: DateFilter,
    content: ContentFetcher,
    output_dir: PathBuf,
}

impl std::fmt::Debug for QueryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCoordinator")
            .field("threads", &self.threads)
            .field("filter", &self.filter)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl QueryCoordinator {
    /// Creates a coordinator from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidThreads`] if `threads` is outside
    /// the valid range.
    #[instrument(level = "debug", skip(pages, extractor, filter, content, output_dir))]
    pub fn new(
        threads: usize,
        pages: Arc<dyn PageSource>,
        extractor: Arc<dyn RecordExtractor>,
        filter: DateFilter,
        content: ContentFetcher,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, CoordinatorError> {
        if !(MIN_THREADS..=MAX_THREADS).contains(&threads) {
            return Err(CoordinatorError::InvalidThreads { value: threads });
        }

        let output_dir = output_dir.into();
        debug!(threads, output_dir = %output_dir.display(), "creating query coordinator");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(threads)),
            threads,
            pages,
            extractor,
            filter,
            content,
            output_dir,
        })
    }

    /// Builds the production pipeline for `config`: a lenient-TLS client for
    /// result pages and a verifying client for documents.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Client`] if a client cannot be built, or
    /// [`CoordinatorError::InvalidThreads`] for an out-of-range thread count.
    pub fn from_config(config: &RunConfig) -> Result<Self, CoordinatorError> {
        let search_client = HttpClient::new(&ClientSettings::from_run_config(config, true))?;
        let document_client = HttpClient::new(&ClientSettings::from_run_config(config, false))?;

        Self::new(
            config.threads,
            Arc::new(PageFetcher::new(search_client, config.endpoint.clone())),
            Arc::new(AnchorRecordExtractor::new(config.endpoint.clone())),
            DateFilter::new(config.filter_years.iter().cloned()),
            ContentFetcher::with_client(document_client),
            &config.output_dir,
        )
    }

    /// Returns the outer pool size.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the directory documents are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs every term to completion.
    ///
    /// Individual page, record and document failures do not fail the run;
    /// they are logged and counted in the returned summary.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::SemaphoreClosed`] if the pool is closed.
    #[instrument(skip(self, terms, base), fields(terms = terms.len(), threads = self.threads))]
    pub async fn run(
        &self,
        terms: &[QueryTerm],
        base: &SearchConfig,
    ) -> Result<RunSummary, CoordinatorError> {
        let started = Instant::now();
        let stats = Arc::new(RunStats::new());
        let claims = Arc::new(DashSet::new());
        let paginator = SearchPaginator::new(
            Arc::clone(&self.pages),
            Arc::clone(&self.extractor),
            self.filter.clone(),
            Arc::clone(&stats),
        );
        let mut handles = Vec::with_capacity(terms.len());

        info!("starting query terms");

        for term in terms {
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| CoordinatorError::SemaphoreClosed)?;

            let term = term.clone();
            let base = base.clone();
            let paginator = paginator.clone();
            let mut scheduler = DownloadScheduler::new(
                self.content.clone(),
                &self.output_dir,
                Arc::clone(&claims),
                Arc::clone(&stats),
            );

            let task_term = term.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                let report = paginator.run(&task_term, &base, &mut scheduler).await;
                scheduler.finish().await;
                report
            });
            handles.push((term, handle));
        }

        let mut failed_terms = Vec::new();
        let mut records_discovered = 0;
        for (term, handle) in handles {
            match handle.await {
                Ok(report) => {
                    records_discovered += report.index.len();
                    if !report.completed() {
                        failed_terms.push(report.term);
                    }
                }
                Err(e) => {
                    warn!(term = %term, error = %e, "query term task panicked");
                    failed_terms.push(term);
                }
            }
        }

        let summary = RunSummary {
            terms: terms.len(),
            failed_terms,
            records_discovered,
            stats: stats.snapshot(),
        };
        info!(
            terms = summary.terms,
            failed_terms = summary.failed_terms.len(),
            records = summary.records_discovered,
            downloaded = summary.stats.downloaded,
            skipped = summary.stats.skipped,
            failed = summary.stats.failed,
            elapsed_ms = started.elapsed().as_millis(),
            "query terms finished"
        );
        Ok(summary)
    }
}
