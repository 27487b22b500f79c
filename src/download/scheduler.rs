//! Bounded, idempotent document downloads for one query term.
//!
//! The scheduler is created per query-term run. Each page's admitted records
//! are handed to [`DownloadScheduler::schedule`], which spawns one task per
//! document not already on disk. Tasks share a semaphore of
//! [`DOCUMENT_WORKERS`] permits, acquired inside the task so the paginator can
//! request the next page while earlier downloads are still running.
//!
//! # Idempotence
//!
//! - A document whose file already exists is skipped without a fetch
//! - A document whose path is claimed by an in-flight task is skipped
//! - Content is written to a `.part` sibling and renamed into place, so a
//!   file that exists is always complete

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashSet;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::content::ContentFetcher;
use super::error::DownloadError;
use super::filename::document_path;
use super::stats::RunStats;
use crate::search::{CompanyDocumentIndex, DocumentRecord};

/// Size of the per-term document download pool.
pub const DOCUMENT_WORKERS: usize = 4;

/// Target paths currently being fetched, shared by every scheduler in a run.
pub type InFlightClaims = Arc<DashSet<PathBuf>>;

static PART_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One scheduled document fetch.
#[derive(Debug, Clone)]
struct DownloadTask {
    record: DocumentRecord,
    path: PathBuf,
}

/// Result of a document task that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentOutcome {
    Written,
    AlreadyPresent,
}

/// Releases an in-flight claim when the owning task ends, even on panic.
struct ClaimGuard {
    claims: InFlightClaims,
    path: PathBuf,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.claims.remove(&self.path);
    }
}

/// Schedules document downloads onto a bounded pool.
#[derive(Debug)]
pub struct DownloadScheduler {
    fetcher: ContentFetcher,
    output_dir: PathBuf,
    claims: InFlightClaims,
    stats: Arc<RunStats>,
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<()>,
}

impl DownloadScheduler {
    /// Creates a scheduler writing under `output_dir`.
    #[must_use]
    pub fn new(
        fetcher: ContentFetcher,
        output_dir: impl Into<PathBuf>,
        claims: InFlightClaims,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            fetcher,
            output_dir: output_dir.into(),
            claims,
            stats,
            semaphore: Arc::new(Semaphore::new(DOCUMENT_WORKERS)),
            tasks: JoinSet::new(),
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the number of spawned tasks not yet joined.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Dispatches a download for every record whose file is not on disk and
    /// not already being fetched. Returns without waiting for the downloads.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn schedule(&mut self, records: &CompanyDocumentIndex) {
        for record in records.records() {
            let path = document_path(&self.output_dir, record);

            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!(path = %path.display(), "document already on disk; skipped");
                self.stats.increment_skipped();
                continue;
            }

            if !self.claims.insert(path.clone()) {
                debug!(path = %path.display(), "document already in flight; skipped");
                self.stats.increment_skipped();
                continue;
            }

            let guard = ClaimGuard {
                claims: Arc::clone(&self.claims),
                path: path.clone(),
            };
            let task = DownloadTask {
                record: record.clone(),
                path,
            };
            let fetcher = self.fetcher.clone();
            let stats = Arc::clone(&self.stats);
            let semaphore = Arc::clone(&self.semaphore);

            self.tasks.spawn(async move {
                let _guard = guard;
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    warn!(link = %task.record.link, "download pool closed; document dropped");
                    stats.increment_failed();
                    return;
                };

                match download_document(&fetcher, &task).await {
                    Ok(DocumentOutcome::Written) => {
                        info!(path = %task.path.display(), "document saved");
                        stats.increment_downloaded();
                    }
                    Ok(DocumentOutcome::AlreadyPresent) => {
                        debug!(path = %task.path.display(), "document written by another task; skipped");
                        stats.increment_skipped();
                    }
                    Err(e) => {
                        if matches!(e, DownloadError::Extraction { .. }) {
                            stats.increment_extraction_failures();
                        }
                        warn!(
                            code = %task.record.code,
                            link = %task.record.link,
                            error = %e,
                            "document download failed"
                        );
                        stats.increment_failed();
                    }
                }
            });
        }
    }

    /// Waits for every scheduled download to finish.
    pub async fn finish(mut self) {
        debug!(pending = self.tasks.len(), "waiting for document downloads");
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "document task panicked");
            }
        }
    }
}

/// Fetches, extracts and writes one document. Rechecks existence after the
/// permit is acquired, since an earlier task may have written the file.
#[instrument(skip(fetcher, task), fields(link = %task.record.link))]
async fn download_document(
    fetcher: &ContentFetcher,
    task: &DownloadTask,
) -> Result<DocumentOutcome, DownloadError> {
    if tokio::fs::try_exists(&task.path).await.unwrap_or(false) {
        return Ok(DocumentOutcome::AlreadyPresent);
    }

    let body = fetcher.extract(&task.record.link).await?;
    write_atomically(&task.path, body.as_bytes()).await?;
    Ok(DocumentOutcome::Written)
}

/// Writes `content` to a unique `.part` sibling of `path`, then renames it
/// into place.
async fn write_atomically(path: &Path, content: &[u8]) -> Result<(), DownloadError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::io(dir, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let part = dir.join(format!(
        ".{file_name}.{}.{}.part",
        std::process::id(),
        PART_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    tokio::fs::write(&part, content)
        .await
        .map_err(|e| DownloadError::io(&part, e))?;

    if let Err(e) = tokio::fs::rename(&part, path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(DownloadError::io(path, e));
    }
    Ok(())
}
