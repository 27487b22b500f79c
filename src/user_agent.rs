//! Shared User-Agent string for search and document requests.

/// Default User-Agent for every request (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("disclosure-dl/{version} (batch disclosure downloader)")
}
