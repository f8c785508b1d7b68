use std::sync::Arc;

use tracing::{debug, warn};

use super::SourceLayout;
use crate::data_source::{MarketDataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::payload::{parse_catalog, parse_history, parse_summary};
use crate::retry::RetryConfig;
use crate::{Catalog, HistoryPoint, InstrumentDetail, InstrumentId};

/// Fetches payloads from a static JSON host.
///
/// Transport errors and transient statuses are retried according to
/// [`RetryConfig`]; everything else fails fast.
#[derive(Clone)]
pub struct HttpSource {
    base_url: String,
    layout: SourceLayout,
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    request_timeout_ms: u64,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn with_http_client(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            layout: SourceLayout::default(),
            http_client,
            retry: RetryConfig::default(),
            request_timeout_ms: 3_000,
        }
    }

    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative.trim_start_matches('/'))
    }

    async fn fetch_body(&self, url: String) -> Result<String, SourceError> {
        let mut attempt = 0;
        loop {
            let request = HttpRequest::get(url.as_str())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.request_timeout_ms);

            let failure = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    let error = SourceError::unavailable(format!(
                        "{url} returned status {}",
                        response.status
                    ));
                    if !self.retry.should_retry_status(response.status) {
                        return Err(error);
                    }
                    error
                }
                Err(error) if error.retryable() => {
                    SourceError::unavailable(format!("transport error for {url}: {}", error.message()))
                }
                Err(error) => {
                    return Err(SourceError::unavailable(format!(
                        "transport error for {url}: {}",
                        error.message()
                    )));
                }
            };

            if attempt >= self.retry.max_retries {
                return Err(failure);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            warn!(url = %url, attempt, delay_ms = delay.as_millis() as u64, error = %failure, "retrying request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl MarketDataSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn catalog<'a>(&'a self) -> SourceFuture<'a, Catalog> {
        Box::pin(async move {
            let url = self.url(&self.layout.catalog);
            debug!(url = %url, "fetching catalog");
            let body = self.fetch_body(url).await?;
            parse_catalog(&body)
        })
    }

    fn summary<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, InstrumentDetail> {
        Box::pin(async move {
            let key = urlencoding::encode(id.as_str());
            let url = self.url(&self.layout.summary_path(&key));
            let body = self.fetch_body(url).await?;
            parse_summary(id.as_str(), &body)
        })
    }

    fn history<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, Vec<HistoryPoint>> {
        Box::pin(async move {
            let history_key = id.history_key();
            let key = urlencoding::encode(&history_key);
            let url = self.url(&self.layout.history_path(&key));
            let body = self.fetch_body(url).await?;
            parse_history(&history_key, &body)
        })
    }
}
