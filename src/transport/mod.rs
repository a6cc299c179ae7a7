mod http_errors;

use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FailureKind;
use crate::model::{SearchRequest, SearchResponse, SearchResponseBody};
use http_errors::{classify_request_error, http_error_detail};

pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SearchResponse, FailureKind>> + 'a>>;

/// Anything that can answer a search request.
pub trait SearchBackend {
    fn search<'a>(&'a self, request: &'a SearchRequest) -> SearchFuture<'a>;
}

/// HTTP client for `POST <base_url>/api/search`.
///
/// Holds one pooled [`reqwest::Client`] for the life of the process.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    api_url: String,
    timeout: Duration,
}

fn search_url(base_url: &str) -> String {
    format!("{}/api/search", base_url.trim_end_matches('/'))
}

impl Transport {
    pub fn new(cfg: &Config) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            client,
            api_url: search_url(&cfg.base_url),
            timeout: cfg.timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn send(&self, request: &SearchRequest) -> Result<SearchResponse, FailureKind> {
        let started = Instant::now();
        debug!(
            api_url = %self.api_url,
            chat_model = %request.chat_model,
            focus_mode = %request.focus_mode,
            history_len = request.history.len(),
            "sending search request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(api_url = %self.api_url, error = %err, "search request failed");
                classify_request_error(&err, &self.api_url, self.timeout)
            })?;

        let status = response.status();
        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            warn!(
                api_url = %self.api_url,
                status = %status,
                response_body_len = response_body.len(),
                "search API returned non-success status"
            );
            return Err(FailureKind::Http {
                url: self.api_url.clone(),
                status: status.as_u16(),
                detail: http_error_detail(status, &response_body),
            });
        }

        let body = response.bytes().await.map_err(|err| {
            warn!(api_url = %self.api_url, error = %err, "failed to read search response body");
            classify_request_error(&err, &self.api_url, self.timeout)
        })?;
        let parsed: SearchResponseBody = serde_json::from_slice(&body).map_err(|err| {
            warn!(
                api_url = %self.api_url,
                error = %err,
                body_len = body.len(),
                "failed to parse search response"
            );
            FailureKind::Transport {
                url: self.api_url.clone(),
                detail: format!("malformed response body: {err}"),
            }
        })?;

        let elapsed = started.elapsed();
        let response = parsed.into_response(status.as_u16(), elapsed);
        info!(
            status = response.status,
            elapsed_ms = elapsed.as_millis() as u64,
            message_len = response.message.len(),
            source_count = response.sources.len(),
            "received search response"
        );
        Ok(response)
    }
}

impl SearchBackend for Transport {
    fn search<'a>(&'a self, request: &'a SearchRequest) -> SearchFuture<'a> {
        Box::pin(self.send(request))
    }
}
