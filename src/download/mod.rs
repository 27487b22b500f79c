//! Document retrieval: HTTP client, body extraction and idempotent writes.
//!
//! Each admitted [`DocumentRecord`](crate::search::DocumentRecord) is fetched,
//! reduced to the text between its date anchor and trailer marker, and written
//! to `<output_dir>/<code>_<name>_<title>_<timestamp>.txt`.
//!
//! # Example
//!
//! ```no_run
//! use disclosure_core::download::{ClientSettings, ContentFetcher, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&ClientSettings::default())?;
//! let fetcher = ContentFetcher::with_client(client);
//! let body = fetcher
//!     .extract("https://investegate.co.uk/Article.aspx/TSCO/20090515_070000/")
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod client;
mod content;
mod error;
pub mod filename;
mod scheduler;
mod stats;

pub use client::{ClientSettings, HttpClient};
pub use content::{
    BoundaryContentExtractor, ContentExtractor, ContentFetcher, DocumentSource, TRAILER_MARKER,
    body_between_anchors, collapse_blank_lines, html_to_text,
};
pub use error::{DownloadError, ExtractionError, FetchError};
pub use filename::{document_file_name, document_path};
pub use scheduler::{DOCUMENT_WORKERS, DownloadScheduler, InFlightClaims};
pub use stats::{RunStats, StatsSnapshot};
