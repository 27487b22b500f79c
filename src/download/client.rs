//! HTTP client wrapper for result pages and document pages.
//!
//! One client is built per run and cloned into tasks, sharing the underlying
//! connection pool. The proxy and timeouts are fixed at construction.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use crate::config::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, RunConfig,
};
use crate::user_agent;

/// Construction settings for [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds. Resets on every received chunk.
    pub read_timeout_secs: u64,
    /// Overall per-request timeout in seconds, body included.
    pub request_timeout_secs: u64,
    /// Optional proxy applied to every request.
    pub proxy: Option<String>,
    /// Accept invalid TLS certificates. The search portal requires this.
    pub accept_invalid_certs: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            proxy: None,
            accept_invalid_certs: false,
        }
    }
}

impl ClientSettings {
    /// Derives settings from a run configuration.
    #[must_use]
    pub fn from_run_config(config: &RunConfig, accept_invalid_certs: bool) -> Self {
        Self {
            connect_timeout_secs: config.connect_timeout_secs,
            read_timeout_secs: config.read_timeout_secs,
            request_timeout_secs: config.request_timeout_secs,
            proxy: config.proxy.clone(),
            accept_invalid_certs,
        }
    }
}

/// HTTP client returning response bodies as text.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Builds a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the proxy address is rejected or
    /// the TLS backend cannot be initialized.
    #[instrument(level = "debug")]
    pub fn new(settings: &ClientSettings) -> Result<Self, reqwest::Error> {
        let mut builder = ClientBuilder::new()
            .user_agent(user_agent::default_user_agent())
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .read_timeout(Duration::from_secs(settings.read_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .gzip(true);

        if settings.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy) = &settings.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetches `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout, or a non-2xx status.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        self.send(parsed).await
    }

    /// Fetches `url` with `query` appended as URL-encoded parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout, or a non-2xx status.
    #[instrument(level = "debug", skip(self, query))]
    pub async fn get_text_with_query(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let mut parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        parsed.query_pairs_mut().extend_pairs(query);
        self.send(parsed).await
    }

    async fn send(&self, url: Url) -> Result<String, FetchError> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(&url_text, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url_text, status = status.as_u16(), "non-success status");
            return Err(FetchError::http_status(url_text, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::network(url_text, e))
    }
}
