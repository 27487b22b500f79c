//! Result-page retrieval.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use crate::config::SearchConfig;
use crate::download::{FetchError, HttpClient};

/// Retrieves raw result-page markup for a search configuration.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches the page described by `config`, including its page number.
    async fn fetch_page(&self, config: &SearchConfig) -> Result<String, FetchError>;
}

/// Issues one GET per page against the search endpoint.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: HttpClient,
    endpoint: Url,
}

impl PageFetcher {
    /// Creates a fetcher for `endpoint`. The client should be built with
    /// `accept_invalid_certs` set, as the portal's certificate does not verify.
    #[must_use]
    pub fn new(client: HttpClient, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Returns the search endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    #[instrument(skip(self, config), fields(term = %config.contains, page = config.page))]
    async fn fetch_page(&self, config: &SearchConfig) -> Result<String, FetchError> {
        let started = Instant::now();
        let result = self
            .client
            .get_text_with_query(self.endpoint.as_str(), &config.to_query_pairs())
            .await;
        debug!(
            elapsed_ms = started.elapsed().as_millis(),
            ok = result.is_ok(),
            "result page request finished"
        );
        result
    }
}
