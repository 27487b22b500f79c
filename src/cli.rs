//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use disclosure_core::config::{
    DEFAULT_SPAN_MONTHS, FileConfig, parse_endpoint, parse_filter_years,
};
use disclosure_core::wordlist::resolve_terms;
use disclosure_core::{ArticleType, ConfigError, RunConfig, SearchConfig, SearchField};

/// Batch discover and download disclosure documents.
///
/// Searches the disclosure portal for each query term, pages through the
/// results, and saves the body of every matching document as a text file.
#[derive(Parser, Debug)]
#[command(name = "disclosure-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Type of document to download (ann or news)
    pub article_type: ArticleType,

    /// Time span of documents in months
    #[arg(short = 't', long = "span", default_value_t = DEFAULT_SPAN_MONTHS)]
    pub span: u32,

    /// News category (news only)
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Index searched: S1 name, S2 EPIC, S3 SEDOL
    #[arg(short = 's', long = "search", default_value = "S1")]
    pub search_field: SearchField,

    /// Comma-separated query terms
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Free-text keyword
    #[arg(short = 'k', long)]
    pub keyword: Option<String>,

    /// CSV word list with a column for the selected index
    #[arg(short = 'w', long)]
    pub wordlist: Option<PathBuf>,

    /// Query terms searched concurrently (1-200)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u16).range(1..=200))]
    pub threads: Option<u16>,

    /// Proxy address for every request
    #[arg(long)]
    pub proxy: Option<String>,

    /// Comma-separated years whose documents are kept
    #[arg(short = 'y', long)]
    pub years: Option<String>,

    /// Directory documents are written to
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Search endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Read timeout in seconds
    #[arg(long)]
    pub read_timeout: Option<u64>,

    /// Overall per-request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds and validates the run configuration. Command-line values win
    /// over `file`, which wins over defaults.
    pub fn into_run_config(self, file: FileConfig) -> Result<RunConfig, ConfigError> {
        let mut search =
            SearchConfig::new(self.article_type, self.search_field).with_span(self.span);
        if let Some(category) = self.category {
            search = search.with_category(category);
        }
        if let Some(keyword) = self.keyword {
            search = search.with_keyword(keyword);
        }
        search.validate()?;

        let terms = resolve_terms(
            self.name.as_deref(),
            self.wordlist.as_deref(),
            self.search_field,
        )?;
        let mut config = RunConfig::new(search, terms)?;

        if let Some(threads) = self.threads.map(usize::from).or(file.threads) {
            config.threads = threads;
        }
        config.proxy = self.proxy.or(file.proxy);
        if let Some(years) = self.years {
            config.filter_years = parse_filter_years(&years)?;
        } else if let Some(years) = file.filter_years {
            config.filter_years = years;
        }
        if let Some(output_dir) = self.output_dir.or(file.output_dir) {
            config.output_dir = output_dir;
        }
        if let Some(endpoint) = self.endpoint.or(file.endpoint) {
            config.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(secs) = self.connect_timeout.or(file.connect_timeout_secs) {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.read_timeout.or(file.read_timeout_secs) {
            config.read_timeout_secs = secs;
        }
        if let Some(secs) = self.request_timeout.or(file.request_timeout_secs) {
            config.request_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use disclosure_core::QueryTerm;

    #[test]
    fn test_cli_minimal_args_parse_successfully() {
        let args = Args::try_parse_from(["disclosure-dl", "ann", "-n", "Tesco"]).unwrap();
        assert_eq!(args.article_type, ArticleType::Announcement);
        assert_eq!(args.search_field, SearchField::Name);
        assert_eq!(args.span, 12);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.threads.is_none());
    }

    #[test]
    fn test_cli_article_type_is_required() {
        let err = Args::try_parse_from(["disclosure-dl"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_unknown_article_type_rejected() {
        let err = Args::try_parse_from(["disclosure-dl", "rumour"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["disclosure-dl", "ann", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["disclosure-dl", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["disclosure-dl", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_threads_range() {
        let args = Args::try_parse_from(["disclosure-dl", "ann", "-r", "200"]).unwrap();
        assert_eq!(args.threads, Some(200));

        for value in ["0", "201"] {
            let err = Args::try_parse_from(["disclosure-dl", "ann", "-r", value]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_search_field_accepts_codes() {
        let args = Args::try_parse_from(["disclosure-dl", "news", "-s", "S2"]).unwrap();
        assert_eq!(args.search_field, SearchField::Epic);
    }

    #[test]
    fn test_run_config_uses_defaults() {
        let args = Args::try_parse_from(["disclosure-dl", "ann", "-n", "Tesco, BARC ,"]).unwrap();
        let config = args.into_run_config(FileConfig::default()).unwrap();

        assert_eq!(
            config.terms,
            vec![QueryTerm::new("Tesco"), QueryTerm::new("BARC")]
        );
        assert_eq!(config.threads, 50);
        assert_eq!(config.filter_years, vec!["2008", "2009", "2010", "2011"]);
        assert_eq!(config.output_dir, PathBuf::from("docs"));
    }

    #[test]
    fn test_run_config_cli_overrides_file() {
        let file = FileConfig {
            threads: Some(8),
            output_dir: Some(PathBuf::from("/srv/file-docs")),
            filter_years: Some(vec!["2012".to_string()]),
            ..FileConfig::default()
        };
        let args = Args::try_parse_from([
            "disclosure-dl",
            "ann",
            "-n",
            "Tesco",
            "-r",
            "3",
            "-y",
            "2009,2010",
        ])
        .unwrap();
        let config = args.into_run_config(file).unwrap();

        assert_eq!(config.threads, 3);
        assert_eq!(config.filter_years, vec!["2009", "2010"]);
        assert_eq!(config.output_dir, PathBuf::from("/srv/file-docs"));
    }

    #[test]
    fn test_run_config_without_terms_fails() {
        let args = Args::try_parse_from(["disclosure-dl", "ann"]).unwrap();
        assert!(matches!(
            args.into_run_config(FileConfig::default()),
            Err(ConfigError::NoQueryTerms)
        ));
    }

    #[test]
    fn test_run_config_category_requires_news() {
        let args =
            Args::try_parse_from(["disclosure-dl", "ann", "-n", "x", "-c", "results"]).unwrap();
        assert!(matches!(
            args.into_run_config(FileConfig::default()),
            Err(ConfigError::CategoryRequiresNews { .. })
        ));
    }

    #[test]
    fn test_run_config_wordlist_wins_over_inline_terms() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name,S2\nTesco plc,TSCO\nBarclays,BARC").unwrap();
        let path = file.path().to_str().unwrap();

        let args =
            Args::try_parse_from(["disclosure-dl", "ann", "-s", "S2", "-n", "ignored", "-w", path])
                .unwrap();
        let config = args.into_run_config(FileConfig::default()).unwrap();

        assert_eq!(
            config.terms,
            vec![QueryTerm::new("TSCO"), QueryTerm::new("BARC")]
        );
    }
}
