//! Result-page record extraction.
//!
//! Each result block starts right after a `CompData.aspx?code=` anchor and
//! runs to the next anchor (or end of page). Fields are cut out of the block
//! with substring and tag-split heuristics:
//!
//! - code: text up to the first `&amp`
//! - company name: fourth `<`/`>` delimited segment, parenthetical removed
//! - link: first `href="..."`, resolved against the search endpoint
//! - title: first `/">...</a>`
//! - timestamp: first 8 characters of the link's second-to-last path segment
//!
//! A block missing any field is reported as an [`ExtractionError`] and
//! skipped; its siblings are still extracted.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::record::DocumentRecord;
use crate::download::ExtractionError;
use crate::utils::{absolutize_url, compile_static_regex};

/// Substring that marks the start of every result block.
pub const RESULT_ANCHOR: &str = "CompData.aspx?code=";

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r#"href="([^"]*)""#));

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r#"/">(.*?)</a>"#));

static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\s\(.*\)"));

/// Everything extracted from one result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Well-formed records, in page order.
    pub records: Vec<DocumentRecord>,
    /// Number of result anchors on the page, including malformed blocks.
    pub anchors: usize,
    /// One entry per malformed block.
    pub failures: Vec<ExtractionError>,
}

impl ExtractedPage {
    /// Returns `true` when the page had no result anchors at all, which ends
    /// pagination.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.anchors == 0
    }
}

/// Parses raw result-page markup into document records.
pub trait RecordExtractor: Send + Sync {
    /// Extracts every result block on the page.
    fn extract(&self, markup: &str) -> ExtractedPage;
}

/// Default extractor for the portal's result table markup.
///
/// Each result row is assumed to carry exactly one [`RESULT_ANCHOR`]: a block
/// ends where the next anchor starts, so a row with a second company link is
/// split in two and its first half fails for lack of a document link.
#[derive(Debug, Clone)]
pub struct AnchorRecordExtractor {
    base_url: Url,
}

impl AnchorRecordExtractor {
    /// Creates an extractor resolving relative links against `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn extract_block(&self, block: &str, offset: usize) -> Result<DocumentRecord, ExtractionError> {
        let code = block
            .find("&amp")
            .map(|end| &block[..end])
            .filter(|code| !code.is_empty() && !code.contains(['"', '<', '>']))
            .ok_or(ExtractionError::missing("code", offset))?;

        let company_name = block
            .split(['<', '>'])
            .nth(3)
            .map(|segment| PARENTHETICAL_RE.replace_all(segment, "").trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(ExtractionError::missing("company name", offset))?;

        let link = HREF_RE
            .captures(block)
            .and_then(|caps| caps.get(1))
            .and_then(|href| absolutize_url(href.as_str(), &self.base_url))
            .ok_or(ExtractionError::missing("link", offset))?;

        let title = TITLE_RE
            .captures(block)
            .and_then(|caps| caps.get(1))
            .map(|title| title.as_str().trim().to_string())
            .ok_or(ExtractionError::missing("title", offset))?;

        let timestamp =
            timestamp_from_link(&link).ok_or(ExtractionError::missing("timestamp", offset))?;

        Ok(DocumentRecord {
            code: code.to_string(),
            company_name,
            link,
            title,
            timestamp,
        })
    }
}

impl RecordExtractor for AnchorRecordExtractor {
    fn extract(&self, markup: &str) -> ExtractedPage {
        let starts: Vec<usize> = markup
            .match_indices(RESULT_ANCHOR)
            .map(|(index, _)| index)
            .collect();

        let mut page = ExtractedPage {
            anchors: starts.len(),
            ..ExtractedPage::default()
        };

        for (i, &start) in starts.iter().enumerate() {
            // Blocks end at the next anchor, one row per anchor.
            let end = starts.get(i + 1).copied().unwrap_or(markup.len());
            let block = &markup[start + RESULT_ANCHOR.len()..end];
            match self.extract_block(block, start) {
                Ok(record) => page.records.push(record),
                Err(e) => page.failures.push(e),
            }
        }
        page
    }
}

/// Returns the first 8 characters of the second-to-last `/` segment.
///
/// Assumes the portal's `.../<code>/<YYYYMMDD_HHMMSS>/` link layout; any other
/// layout yields an arbitrary string.
#[must_use]
pub fn timestamp_from_link(link: &str) -> Option<String> {
    let segments: Vec<&str> = link.split('/').collect();
    let segment = segments.len().checked_sub(2).map(|i| segments[i])?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.chars().take(8).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ROW: &str = r#"<tr><td><a href="CompData.aspx?code=TSCO&amp;src=s"><b>Tesco PLC (TSCO)</b></a></td><td><a href="/Article.aspx/TSCO/20090515_070000/">Final Results</a></td></tr>"#;

    fn extractor() -> AnchorRecordExtractor {
        AnchorRecordExtractor::new(Url::parse("https://investegate.co.uk/AdvancedSearch.aspx").unwrap())
    }

    #[test]
    fn test_extracts_well_formed_block() {
        let page = extractor().extract(&format!("<table>{ROW}</table>"));

        assert_eq!(page.anchors, 1);
        assert!(page.failures.is_empty());
        assert_eq!(
            page.records,
            vec![DocumentRecord {
                code: "TSCO".to_string(),
                company_name: "Tesco PLC".to_string(),
                link: "https://investegate.co.uk/Article.aspx/TSCO/20090515_070000/".to_string(),
                title: "Final Results".to_string(),
                timestamp: "20090515".to_string(),
            }]
        );
    }

    #[test]
    fn test_page_without_anchors_is_last() {
        let page = extractor().extract("<html><body>No results found</body></html>");
        assert!(page.is_last());
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_multiple_blocks_keep_their_own_fields() {
        let second = ROW
            .replace("TSCO", "MKS")
            .replace("Tesco PLC", "Marks &amp; Spencer")
            .replace("20090515", "20100302")
            .replace("Final Results", "Trading Update");
        let page = extractor().extract(&format!("{ROW}{second}"));

        assert_eq!(page.anchors, 2);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].code, "MKS");
        assert_eq!(page.records[1].title, "Trading Update");
        assert_eq!(page.records[1].timestamp, "20100302");
    }

    #[test]
    fn test_malformed_block_is_skipped_and_counted() {
        let broken = r#"<tr><td><a href="CompData.aspx?code=BAD&amp;src=s"><b>Broken plc</b></a></td><td>no link</td></tr>"#;
        let page = extractor().extract(&format!("{broken}{ROW}"));

        assert_eq!(page.anchors, 2);
        assert!(!page.is_last());
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].code, "TSCO");
        assert_eq!(page.failures.len(), 1);
        assert!(matches!(
            page.failures[0],
            ExtractionError::MissingField { field: "link", .. }
        ));
    }

    #[test]
    fn test_row_with_second_company_link_splits_into_two_blocks() {
        let row = ROW.replace(
            "</b></a></td>",
            r#"</b></a> <a href="CompData.aspx?code=TSCO&amp;src=x">more</a></td>"#,
        );
        let page = extractor().extract(&row);

        assert_eq!(page.anchors, 2);
        assert_eq!(page.records.len() + page.failures.len(), 2);
        assert!(matches!(
            page.failures[0],
            ExtractionError::MissingField { field: "link", .. }
        ));
    }

    #[test]
    fn test_block_without_code_delimiter_fails() {
        let page = extractor().extract(r#"<a href="CompData.aspx?code=XYZ"><b>X</b></a>"#);
        assert_eq!(page.anchors, 1);
        assert!(matches!(
            page.failures[0],
            ExtractionError::MissingField { field: "code", .. }
        ));
    }

    #[test]
    fn test_absolute_links_are_kept() {
        let row = ROW.replace(
            "/Article.aspx/TSCO/20090515_070000/",
            "https://mirror.example/Article.aspx/TSCO/20090515_070000/",
        );
        let page = extractor().extract(&row);
        assert_eq!(
            page.records[0].link,
            "https://mirror.example/Article.aspx/TSCO/20090515_070000/"
        );
    }

    #[test]
    fn test_timestamp_from_link() {
        assert_eq!(
            timestamp_from_link("https://x/Article.aspx/ABC/20090101_0700/").as_deref(),
            Some("20090101")
        );
        assert_eq!(timestamp_from_link("https://x/a/b/").as_deref(), Some("b"));
        assert_eq!(timestamp_from_link("nolink"), None);
    }
}
