//! Search parameters and run configuration.
//!
//! A [`RunConfig`] is assembled once at startup (command line, optional config
//! file, defaults), validated, and then handed to the pipeline. Each query term
//! receives its own [`SearchConfig`] copy via [`SearchConfig::for_term`], so
//! concurrent paginators never share mutable search state.

mod error;
pub mod file;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

pub use error::ConfigError;
pub use file::{FileConfig, load_file_config, resolve_default_config_path};

use crate::wordlist::QueryTerm;

/// Fixed search endpoint of the disclosure portal.
pub const DEFAULT_ENDPOINT: &str = "https://investegate.co.uk/AdvancedSearch.aspx";

/// Default output directory for downloaded documents.
pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Default outer pool size (simultaneous query terms).
pub const DEFAULT_THREADS: usize = 50;

/// Minimum allowed outer pool size.
pub const MIN_THREADS: usize = 1;

/// Maximum allowed outer pool size.
pub const MAX_THREADS: usize = 200;

/// Default search time span in months.
pub const DEFAULT_SPAN_MONTHS: u32 = 12;

/// Default filter-year allow-list.
pub const DEFAULT_FILTER_YEARS: [&str; 4] = ["2008", "2009", "2010", "2011"];

/// Default HTTP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Default overall per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Kind of disclosure to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleType {
    /// Regulatory announcements.
    Announcement,
    /// News articles (the only type that accepts a category).
    News,
}

impl ArticleType {
    /// Returns the query-parameter value sent to the portal.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Announcement => "ann",
            Self::News => "news",
        }
    }
}

impl FromStr for ArticleType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ann" | "announcement" => Ok(Self::Announcement),
            "news" => Ok(Self::News),
            _ => Err(ConfigError::UnknownArticleType {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Index field a query term is searched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// Company name (`S1`).
    Name,
    /// EPIC ticker code (`S2`).
    Epic,
    /// SEDOL identifier (`S3`).
    Sedol,
}

impl SearchField {
    /// Returns the query-parameter value sent to the portal.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Name => "S1",
            Self::Epic => "S2",
            Self::Sedol => "S3",
        }
    }

    /// Returns the human-readable label, also accepted as a word list column.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Epic => "epic",
            Self::Sedol => "sedol",
        }
    }
}

impl FromStr for SearchField {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "s1" | "name" => Ok(Self::Name),
            "s2" | "epic" => Ok(Self::Epic),
            "s3" | "sedol" => Ok(Self::Sedol),
            _ => Err(ConfigError::UnknownSearchField {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Query parameters for one search request.
///
/// `page` is the only field that changes during a run, and only the owning
/// paginator advances it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Announcement or news.
    pub article_type: ArticleType,
    /// Time span in months.
    pub span_months: u32,
    /// Optional news category.
    pub category: Option<String>,
    /// Index field searched.
    pub search_field: SearchField,
    /// The query term; empty on the base configuration.
    pub contains: String,
    /// Optional free-text keyword.
    pub keyword: Option<String>,
    /// One-based result page number.
    pub page: u32,
}

impl SearchConfig {
    /// Creates a base configuration with no term, default span, page 1.
    #[must_use]
    pub fn new(article_type: ArticleType, search_field: SearchField) -> Self {
        Self {
            article_type,
            span_months: DEFAULT_SPAN_MONTHS,
            category: None,
            search_field,
            contains: String::new(),
            keyword: None,
            page: 1,
        }
    }

    /// Sets the time span in months.
    #[must_use]
    pub fn with_span(mut self, span_months: u32) -> Self {
        self.span_months = span_months;
        self
    }

    /// Sets the news category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the free-text keyword.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Returns an independent copy bound to `term`, starting at page 1.
    #[must_use]
    pub fn for_term(&self, term: &str) -> Self {
        Self {
            contains: term.to_string(),
            page: 1,
            ..self.clone()
        }
    }

    /// Checks that the parameter combination is meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CategoryRequiresNews`] when a category is set on
    /// an announcement search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.article_type != ArticleType::News
            && let Some(category) = &self.category
        {
            return Err(ConfigError::CategoryRequiresNews {
                category: category.clone(),
            });
        }
        Ok(())
    }

    /// Serializes the configuration to query parameters, omitting absent options.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("qsArticleType", self.article_type.as_param().to_string()),
            ("qsSpan", self.span_months.to_string()),
        ];
        if self.article_type == ArticleType::News
            && let Some(category) = &self.category
        {
            pairs.push(("qsNewsCategory", category.clone()));
        }
        pairs.push(("qsSearchFor", self.search_field.code().to_string()));
        pairs.push(("qsContains", self.contains.clone()));
        if let Some(keyword) = &self.keyword {
            pairs.push(("qsKeyWord", keyword.clone()));
        }
        pairs.push(("pno", self.page.to_string()));
        pairs
    }
}

/// Fully assembled configuration for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base search parameters, copied per query term.
    pub search: SearchConfig,
    /// Query terms, one paginated search each.
    pub terms: Vec<QueryTerm>,
    /// Outer pool size.
    pub threads: usize,
    /// Optional proxy for every request.
    pub proxy: Option<String>,
    /// Years admitted by the date filter.
    pub filter_years: Vec<String>,
    /// Directory receiving one `.txt` file per document.
    pub output_dir: PathBuf,
    /// Search endpoint.
    pub endpoint: Url,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// Overall per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl RunConfig {
    /// Creates a run configuration with defaults for everything but the search
    /// parameters and terms.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the built-in endpoint fails
    /// to parse.
    pub fn new(search: SearchConfig, terms: Vec<QueryTerm>) -> Result<Self, ConfigError> {
        Ok(Self {
            search,
            terms,
            threads: DEFAULT_THREADS,
            proxy: None,
            filter_years: DEFAULT_FILTER_YEARS.iter().map(ToString::to_string).collect(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }

    /// Validates every setting. Called once before any network work.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;

        if self.terms.is_empty() {
            return Err(ConfigError::NoQueryTerms);
        }

        if !(MIN_THREADS..=MAX_THREADS).contains(&self.threads) {
            return Err(ConfigError::InvalidThreads {
                value: self.threads,
                min: MIN_THREADS,
                max: MAX_THREADS,
            });
        }

        validate_timeout("connect timeout", self.connect_timeout_secs)?;
        validate_timeout("read timeout", self.read_timeout_secs)?;
        validate_timeout("request timeout", self.request_timeout_secs)?;

        if let Some(proxy) = &self.proxy {
            reqwest::Proxy::all(proxy.as_str()).map_err(|e| ConfigError::InvalidProxy {
                value: proxy.clone(),
                reason: e.to_string(),
            })?;
        }

        if self.filter_years.is_empty() {
            return Err(ConfigError::EmptyFilterYears);
        }
        for year in &self.filter_years {
            validate_year(year)?;
        }

        Ok(())
    }
}

/// Parses a search endpoint URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] when `value` is not an absolute
/// http(s) URL.
pub fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            value: value.to_string(),
            reason: format!("scheme '{}' is not supported", url.scheme()),
        });
    }
    Ok(url)
}

/// Splits a comma-separated year list, validating each entry.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidFilterYear`] for any entry that is not four
/// digits, or [`ConfigError::EmptyFilterYears`] if nothing remains.
pub fn parse_filter_years(value: &str) -> Result<Vec<String>, ConfigError> {
    let years: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();
    if years.is_empty() {
        return Err(ConfigError::EmptyFilterYears);
    }
    for year in &years {
        validate_year(year)?;
    }
    Ok(years)
}

fn validate_year(year: &str) -> Result<(), ConfigError> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFilterYear {
            value: year.to_string(),
        })
    }
}

fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if (1..=3600).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout { field, value })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> SearchConfig {
        SearchConfig::new(ArticleType::Announcement, SearchField::Name)
    }

    fn run_config() -> RunConfig {
        RunConfig::new(base(), vec![QueryTerm::new("Tesco")]).unwrap()
    }

    #[test]
    fn test_article_type_parses_labels() {
        assert_eq!("ann".parse::<ArticleType>().unwrap(), ArticleType::Announcement);
        assert_eq!("NEWS".parse::<ArticleType>().unwrap(), ArticleType::News);
        assert!("rumour".parse::<ArticleType>().is_err());
    }

    #[test]
    fn test_search_field_parses_codes_and_labels() {
        assert_eq!("S1".parse::<SearchField>().unwrap(), SearchField::Name);
        assert_eq!("epic".parse::<SearchField>().unwrap(), SearchField::Epic);
        assert_eq!("s3".parse::<SearchField>().unwrap(), SearchField::Sedol);
        assert!("S4".parse::<SearchField>().is_err());
    }

    #[test]
    fn test_for_term_copies_and_resets_page() {
        let mut shared = base().with_keyword("results");
        shared.page = 7;
        let copy = shared.for_term("BARC");
        assert_eq!(copy.contains, "BARC");
        assert_eq!(copy.page, 1);
        assert_eq!(copy.keyword.as_deref(), Some("results"));
        assert!(shared.contains.is_empty(), "base config must be untouched");
        assert_eq!(shared.page, 7);
    }

    #[test]
    fn test_query_pairs_omit_absent_options() {
        let pairs = base().for_term("Tesco").to_query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["qsArticleType", "qsSpan", "qsSearchFor", "qsContains", "pno"]
        );
        assert!(pairs.contains(&("qsArticleType", "ann".to_string())));
        assert!(pairs.contains(&("pno", "1".to_string())));
    }

    #[test]
    fn test_query_pairs_include_news_category_and_keyword() {
        let config = SearchConfig::new(ArticleType::News, SearchField::Epic)
            .with_category("results")
            .with_keyword("dividend")
            .for_term("TSCO");
        let pairs = config.to_query_pairs();
        assert!(pairs.contains(&("qsNewsCategory", "results".to_string())));
        assert!(pairs.contains(&("qsKeyWord", "dividend".to_string())));
        assert!(pairs.contains(&("qsSearchFor", "S2".to_string())));
    }

    #[test]
    fn test_category_on_announcement_rejected() {
        let config = base().with_category("results");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CategoryRequiresNews { .. })
        ));
    }

    #[test]
    fn test_run_config_defaults_validate() {
        let config = run_config();
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert_eq!(config.output_dir, PathBuf::from("docs"));
        assert_eq!(config.filter_years, vec!["2008", "2009", "2010", "2011"]);
        config.validate().unwrap();
    }

    #[test]
    fn test_run_config_without_terms_rejected() {
        let mut config = run_config();
        config.terms.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoQueryTerms)));
    }

    #[test]
    fn test_run_config_thread_bounds() {
        let mut config = run_config();
        config.threads = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreads { value: 0, .. })
        ));
        config.threads = MAX_THREADS;
        config.validate().unwrap();
    }

    #[test]
    fn test_run_config_invalid_proxy_rejected() {
        let mut config = run_config();
        config.proxy = Some("not a proxy".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProxy { .. })
        ));
    }

    #[test]
    fn test_run_config_accepts_bare_host_port_proxy() {
        let mut config = run_config();
        config.proxy = Some("127.0.0.1:8080".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn test_run_config_zero_request_timeout_rejected() {
        let mut config = run_config();
        config.request_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout { value: 0, .. })
        ));
    }

    #[test]
    fn test_run_config_zero_timeout_rejected() {
        let mut config = run_config();
        config.read_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout { value: 0, .. })
        ));
    }

    #[test]
    fn test_parse_filter_years() {
        assert_eq!(
            parse_filter_years("2009, 2010,").unwrap(),
            vec!["2009", "2010"]
        );
        assert!(matches!(
            parse_filter_years(" , "),
            Err(ConfigError::EmptyFilterYears)
        ));
        assert!(matches!(
            parse_filter_years("2009,09"),
            Err(ConfigError::InvalidFilterYear { .. })
        ));
    }

    #[test]
    fn test_parse_endpoint_rejects_non_http() {
        assert!(parse_endpoint("ftp://example.com/search").is_err());
        assert!(parse_endpoint("http://127.0.0.1:8080/AdvancedSearch.aspx").is_ok());
    }
}
