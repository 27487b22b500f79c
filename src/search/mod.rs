//! Result-page discovery: fetch, extract, filter and paginate.
//!
//! A [`SearchPaginator`] walks the result pages for one query term. Each page
//! is fetched by a [`PageSource`] ([`PageFetcher`] in production), parsed by a
//! [`RecordExtractor`], filtered by a [`DateFilter`], and the admitted records
//! are handed to the term's download scheduler before the next page is
//! requested.

mod date_filter;
mod extractor;
mod fetcher;
mod paginator;
mod record;

pub use date_filter::{DateFilter, admit};
pub use extractor::{
    AnchorRecordExtractor, ExtractedPage, RESULT_ANCHOR, RecordExtractor, timestamp_from_link,
};
pub use fetcher::{PageFetcher, PageSource};
pub use paginator::{SearchPaginator, TermReport};
pub use record::{CompanyDocumentIndex, DocumentRecord};
