//! Transport seam between the console and the remote admin API.
//!
//! # Design
//! - Requests are plain data; implementations only move bytes.
//! - Non-2xx responses are surfaced as `ApiResponse`s so callers can classify them.
//! - Keep `?Send` futures: the browser client is single-threaded.

use crate::core::descriptor::encode_query;
use crate::core::session::SessionContext;
use async_trait::async_trait;
use serde_json::Value;
use warden_api_models::ApiErrorBody;

/// Shown when the server could not be reached at all.
pub const NETWORK_FAILURE_MESSAGE: &str = "Unable to reach the server. Check your connection and try again.";

/// HTTP verbs used by the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// Read.
    Get,
    /// Create or command.
    Post,
    /// Full update.
    Put,
    /// Partial update.
    Patch,
    /// Remove.
    Delete,
}

impl HttpMethod {
    /// Upper-case verb for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Outbound request relative to the API base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Path relative to the base URL, without a leading slash.
    pub path: String,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// `Authorization` header value.
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// Request with no query, body or credentials.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the session bearer token, if any.
    #[must_use]
    pub fn with_session(mut self, session: &SessionContext) -> Self {
        self.bearer = session.bearer();
        self
    }

    /// Absolute URL against `base_url`.
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        if self.query.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{path}?{}", encode_query(&self.query))
        }
    }
}

/// Raw response as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text, possibly empty.
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parse the body as JSON; an empty body reads as `null`.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] for malformed JSON.
    pub fn json(&self) -> Result<Value, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

/// Failures talking to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("server responded with {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body, or a generic fallback.
        message: String,
    },
    /// A 2xx response could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-2xx response, pulling the most specific message from its body.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.best_message())
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));
        Self::Server {
            status: response.status,
            message,
        }
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Message suitable for a toast or inline error.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Decode(_) => "The server sent a response the console could not read.".to_string(),
        }
    }

    /// Whether the session should be dropped.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401, .. })
    }
}

/// Moves requests to the remote API.
#[async_trait(?Send)]
pub trait Transport {
    /// Send a request. Only transport failures are errors; any HTTP status is a response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Send a request and decode a 2xx JSON body, classifying everything else.
///
/// # Errors
/// Returns [`ApiError`] for transport failures, non-2xx statuses and bad JSON.
pub async fn send_json<T: Transport + ?Sized>(
    transport: &T,
    request: ApiRequest,
) -> Result<Value, ApiError> {
    let method = request.method;
    let path = request.path.clone();
    let response = transport.send(request).await.inspect_err(|err| {
        tracing::warn!(method = method.as_str(), %path, error = %err, "request failed");
    })?;
    if !response.is_success() {
        let err = ApiError::from_response(&response);
        tracing::warn!(method = method.as_str(), %path, status = response.status, "request rejected");
        return Err(err);
    }
    tracing::debug!(method = method.as_str(), %path, status = response.status, "request completed");
    response.json()
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted transport for tests.

    use super::{ApiError, ApiRequest, ApiResponse, Transport};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays queued responses and records every request.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        responses: RefCell<VecDeque<Result<ApiResponse, ApiError>>>,
        pub(crate) requests: RefCell<Vec<ApiRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn reply(&self, status: u16, body: &Value) {
            self.responses.borrow_mut().push_back(Ok(ApiResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub(crate) fn fail(&self, message: &str) {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::Network(message.to_string())));
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub(crate) fn last_request(&self) -> Option<ApiRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    #[async_trait(?Send)]
    impl Transport for FakeTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
        }
    }
}
