use std::future::Future;
use std::time::Duration;

use eyre::Result;
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::SummarizeError;
use crate::record::VideoInfo;
use crate::{SummaryLength, SummaryStyle};

/// Body of a summarization request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRequest {
    pub video_id: String,
    pub length: SummaryLength,
    pub style: SummaryStyle,
}

/// Fields of a backend reply that the client consumes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SummaryResponse {
    pub summary: Option<String>,
    pub video_info: Option<VideoInfo>,
    pub analysis: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

/// The remote service that turns a video ID into a summary
pub trait SummaryBackend {
    fn summarize(
        &self,
        request: &SummaryRequest,
    ) -> impl Future<Output = Result<SummaryResponse, SummarizeError>> + Send;
}

/// JSON-over-HTTP backend (`POST <base>/summarize`)
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/summarize", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> SummarizeError {
        debug!("Request to {} failed: {err:?}", self.endpoint);
        if err.is_timeout() {
            SummarizeError::Timeout
        } else if err.is_connect() {
            SummarizeError::NetworkUnreachable {
                endpoint: self.endpoint.clone(),
            }
        } else {
            SummarizeError::UnknownFailure(err.to_string())
        }
    }
}

impl SummaryBackend for HttpBackend {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, SummarizeError> {
        debug!(
            "POST {} video_id={} length={} style={}",
            self.endpoint, request.video_id, request.length, request.style
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify(e))?;
        debug!("Backend answered {status} ({} bytes)", body.len());

        parse_response(status, &body)
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<SummaryResponse, SummarizeError> {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) if !status.is_success() => {
            return Err(SummarizeError::UnknownFailure(format!("backend returned {status}")));
        }
        Err(e) => {
            return Err(SummarizeError::UnknownFailure(format!(
                "unexpected backend response: {e}"
            )));
        }
    };

    if let Some(message) = extract_error_message(&json) {
        return Err(SummarizeError::BackendError(message));
    }

    if !status.is_success() {
        return Err(SummarizeError::UnknownFailure(format!("backend returned {status}")));
    }

    serde_json::from_value(json)
        .map_err(|e| SummarizeError::UnknownFailure(format!("unexpected backend response: {e}")))
}

/// `{"error": "..."}` from the service itself, or `{"detail": "..."}` from its framework
fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    ["error", "detail"]
        .iter()
        .find_map(|key| json.get(key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
