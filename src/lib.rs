//! Disclosure Downloader Core Library
//!
//! This library crawls a paginated financial-disclosure search portal,
//! discovers document metadata for a list of query terms, and downloads the
//! body text of each disclosure into a flat directory of `.txt` files.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Search parameters, run configuration and validation
//! - [`search`] - Result-page fetching, record extraction, date filtering, pagination
//! - [`download`] - Document fetching, body extraction, idempotent file writes
//! - [`coordinator`] - Fan-out of one search pipeline per query term
//! - [`wordlist`] - Query-term loading from inline lists or CSV word lists
//! - [`catalog`] - Round-trip of document filenames into a tabular export

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod download;
pub mod search;
mod user_agent;
mod utils;
pub mod wordlist;

// Re-export commonly used types
pub use config::{ArticleType, ConfigError, RunConfig, SearchConfig, SearchField};
pub use coordinator::{CoordinatorError, QueryCoordinator, RunSummary};
pub use download::{
    ContentFetcher, DOCUMENT_WORKERS, DownloadError, DownloadScheduler, ExtractionError,
    FetchError, HttpClient, RunStats, StatsSnapshot,
};
pub use search::{
    CompanyDocumentIndex, DateFilter, DocumentRecord, PageFetcher, RecordExtractor,
    SearchPaginator,
};
pub use wordlist::QueryTerm;
