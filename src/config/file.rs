//! Optional key = value config file supplying run defaults.
//!
//! Lookup order for the default path:
//! 1. `$XDG_CONFIG_HOME/disclosure-dl/config.toml`
//! 2. `$HOME/.config/disclosure-dl/config.toml`
//!
//! Command-line values always win over file values.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ConfigError, MAX_THREADS, MIN_THREADS, parse_endpoint, parse_filter_years};

/// Run defaults read from a config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Output directory for documents.
    pub output_dir: Option<PathBuf>,
    /// Outer pool size.
    pub threads: Option<usize>,
    /// Proxy address.
    pub proxy: Option<String>,
    /// Filter-year allow-list.
    pub filter_years: Option<Vec<String>>,
    /// Search endpoint override.
    pub endpoint: Option<String>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Overall per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

/// Resolves the default config path, if a base directory is known.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("disclosure-dl")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("disclosure-dl")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Reads and parses a config file.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigFileIo`] if the file cannot be read and
/// [`ConfigError::ConfigFileSyntax`] for any invalid line or value.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(path, &raw)
}

pub(crate) fn parse_config_str(path: &Path, raw: &str) -> Result<FileConfig, ConfigError> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::syntax(path, line_no, "expected key = value"));
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = |reason: String| ConfigError::syntax(path, line_no, format!("`{key}`: {reason}"));

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(parse_string_literal(value).map_err(invalid)?));
            }
            "threads" => {
                let threads = parse_integer(value).map_err(invalid)?;
                let threads = usize::try_from(threads)
                    .ok()
                    .filter(|t| (MIN_THREADS..=MAX_THREADS).contains(t))
                    .ok_or_else(|| {
                        invalid(format!(
                            "{threads} outside range {MIN_THREADS}..={MAX_THREADS}"
                        ))
                    })?;
                cfg.threads = Some(threads);
            }
            "proxy" => {
                cfg.proxy = Some(parse_string_literal(value).map_err(invalid)?);
            }
            "filter_years" => {
                let raw_years = parse_string_literal(value).map_err(invalid)?;
                let years = parse_filter_years(&raw_years).map_err(|e| invalid(e.to_string()))?;
                cfg.filter_years = Some(years);
            }
            "endpoint" => {
                let endpoint = parse_string_literal(value).map_err(invalid)?;
                parse_endpoint(&endpoint).map_err(|e| invalid(e.to_string()))?;
                cfg.endpoint = Some(endpoint);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_timeout(value).map_err(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_timeout(value).map_err(invalid)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(parse_timeout(value).map_err(invalid)?);
            }
            unknown => {
                return Err(ConfigError::syntax(
                    path,
                    line_no,
                    format!("unknown configuration key '{unknown}'"),
                ));
            }
        }
    }
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String, String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return Err("expected double-quoted string".to_string());
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer(raw_value: &str) -> Result<u64, String> {
    let token = raw_value.trim();
    if token.is_empty() {
        return Err("expected integer value".to_string());
    }
    token
        .parse::<u64>()
        .map_err(|e| format!("expected non-negative integer: {e}"))
}

fn parse_timeout(raw_value: &str) -> Result<u64, String> {
    let value = parse_integer(raw_value)?;
    if (1..=3600).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} outside range 1..=3600"))
    }
}
