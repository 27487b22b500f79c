//! Document body extraction.
//!
//! A document page is reduced to plain text, runs of blank lines are collapsed,
//! and the body is the text strictly between the first "DD Month, YYYY" date
//! anchor and the trailer marker that starts the boilerplate. If either
//! boundary is missing the extraction fails and no file is written.

use std::fmt;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use tracing::{debug, instrument};

use super::HttpClient;
use super::error::{DownloadError, ExtractionError, FetchError};
use crate::utils::compile_static_regex;

/// Phrase marking the start of the boilerplate trailer.
pub const TRAILER_MARKER: &str = "This information is provided by RNS";

/// "15 May, 2009" style date that precedes the document body.
static DATE_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r"[0-3][0-9] (?:January|February|March|April|May|June|July|August|September|October|November|December), (?:19|20)\d\d",
    )
});

/// Two or more line breaks, with any whitespace-only lines between them.
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"\n[ \t\r\f]*(?:\n[ \t\r\f]*)+"));

/// Retrieves raw document pages.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the document page at `url`.
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl DocumentSource for HttpClient {
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }
}

/// Turns a raw document page into its body text.
pub trait ContentExtractor: Send + Sync {
    /// Extracts the body of `html`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] if a boundary cannot be located.
    fn extract_body(&self, html: &str) -> Result<String, ExtractionError>;
}

/// Default extractor: markup stripped, body cut between date anchor and trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryContentExtractor;

impl ContentExtractor for BoundaryContentExtractor {
    fn extract_body(&self, html: &str) -> Result<String, ExtractionError> {
        let text = collapse_blank_lines(&html_to_text(html));
        body_between_anchors(&text)
    }
}

/// Strips all markup, keeping text nodes outside `<script>` and `<style>`.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| matches!(element.name(), "script" | "style"))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }
    text
}

/// Collapses every run of blank lines to a single blank line.
#[must_use]
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}

/// Returns the trimmed text between the first date anchor and the trailer
/// marker that follows it.
///
/// # Errors
///
/// Returns [`ExtractionError::MissingDateAnchor`] or
/// [`ExtractionError::MissingTrailer`] when a boundary is absent.
pub fn body_between_anchors(text: &str) -> Result<String, ExtractionError> {
    let anchor = DATE_ANCHOR_RE
        .find(text)
        .ok_or(ExtractionError::MissingDateAnchor)?;
    let rest = &text[anchor.end()..];
    let end = rest
        .find(TRAILER_MARKER)
        .ok_or(ExtractionError::MissingTrailer)?;
    Ok(rest[..end].trim().to_string())
}

/// Fetches a document and extracts its body.
#[derive(Clone)]
pub struct ContentFetcher {
    source: Arc<dyn DocumentSource>,
    extractor: Arc<dyn ContentExtractor>,
}

impl fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentFetcher").finish_non_exhaustive()
    }
}

impl ContentFetcher {
    /// Creates a fetcher from a document source and a body extractor.
    #[must_use]
    pub fn new(source: Arc<dyn DocumentSource>, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self { source, extractor }
    }

    /// Creates a fetcher using `client` and the [`BoundaryContentExtractor`].
    #[must_use]
    pub fn with_client(client: HttpClient) -> Self {
        Self::new(Arc::new(client), Arc::new(BoundaryContentExtractor))
    }

    /// Fetches `link` and returns the document body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Fetch`] if the page cannot be retrieved and
    /// [`DownloadError::Extraction`] if the body boundaries are missing.
    #[instrument(skip(self))]
    pub async fn extract(&self, link: &str) -> Result<String, DownloadError> {
        let html = self.source.fetch_document(link).await?;
        let body = self
            .extractor
            .extract_body(&html)
            .map_err(|source| DownloadError::extraction(link, source))?;
        debug!(bytes = body.len(), "extracted document body");
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_body_between_anchors_trims_to_body() {
        let text = "...noise... 15 May, 2009 BODY TEXT This information is provided by RNS ...trailer...";
        assert_eq!(body_between_anchors(text).unwrap(), "BODY TEXT");
    }

    #[test]
    fn test_body_between_anchors_uses_first_date() {
        let text = "Released 01 June, 2010\nFirst para.\nDated 02 June, 2010\nThis information is provided by RNS";
        assert_eq!(
            body_between_anchors(text).unwrap(),
            "First para.\nDated 02 June, 2010"
        );
    }

    #[test]
    fn test_body_between_anchors_missing_date() {
        let text = "no date here This information is provided by RNS";
        assert_eq!(
            body_between_anchors(text),
            Err(ExtractionError::MissingDateAnchor)
        );
    }

    #[test]
    fn test_body_between_anchors_missing_trailer() {
        assert_eq!(
            body_between_anchors("15 May, 2009 body without trailer"),
            Err(ExtractionError::MissingTrailer)
        );
    }

    #[test]
    fn test_body_between_anchors_trailer_before_date_is_missing() {
        let text = "This information is provided by RNS 15 May, 2009 body";
        assert_eq!(
            body_between_anchors(text),
            Err(ExtractionError::MissingTrailer)
        );
    }

    #[test]
    fn test_date_anchor_requires_two_digit_day() {
        assert!(body_between_anchors("5 May, 2009 x This information is provided by RNS").is_err());
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n   \n\t\n b"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\nb"), "a\nb");
    }

    #[test]
    fn test_html_to_text_strips_markup_and_scripts() {
        let html = "<html><head><style>p{}</style><script>var x = 1;</script></head>\
                    <body><p>Hello <b>world</b></p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Hello world"), "got: {text:?}");
        assert!(!text.contains("var x"), "got: {text:?}");
        assert!(!text.contains("p{}"), "got: {text:?}");
        assert!(!text.contains('<'), "got: {text:?}");
    }

    #[test]
    fn test_boundary_extractor_on_document_markup() {
        let html = "<html><body><div class=\"hdr\">RNS Number : 1234X</div>\
                    <p>15 May, 2009</p>\n\n\n<p>Tesco PLC announces results.</p>\n\n\
                    <p>Dividend up.</p><p>This information is provided by RNS</p>\
                    <p>The company news service</p></body></html>";
        let body = BoundaryContentExtractor.extract_body(html).unwrap();
        assert!(body.starts_with("Tesco PLC announces results."), "got: {body:?}");
        assert!(body.ends_with("Dividend up."), "got: {body:?}");
        assert!(!body.contains("RNS Number"), "got: {body:?}");
    }
}
