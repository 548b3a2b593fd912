//! Browser transport backed by `gloo-net`.

use crate::services::transport::{ApiError, ApiRequest, ApiResponse, HttpMethod, Transport};
use async_trait::async_trait;
use gloo_net::http::Request;

/// Fetch-API transport rooted at the configured base URL.
#[derive(Clone, Debug)]
pub(crate) struct GlooTransport {
    base_url: String,
}

impl GlooTransport {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = request.url(&self.base_url);
        let mut req = match request.method {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
            HttpMethod::Put => Request::put(&url),
            HttpMethod::Patch => Request::patch(&url),
            HttpMethod::Delete => Request::delete(&url),
        }
        .header("accept", "application/json");
        if let Some(bearer) = &request.bearer {
            req = req.header("authorization", bearer);
        }
        let sent = match &request.body {
            Some(body) => req
                .json(body)
                .map_err(|err| ApiError::Network(err.to_string()))?
                .send()
                .await,
            None => req.send().await,
        };
        let response = sent.map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            tracing::warn!(%url, status, error = %err, "response body unreadable");
            ApiError::Network(format!("could not read response body: {err}"))
        })?;
        Ok(ApiResponse { status, body })
    }
}
