//! Request gateway
//!
//! Every backend call goes through [`Gateway::call`] (or one of its method
//! wrappers) so that all callers see the same behavior:
//!
//! - JSON content type plus the operator's identity headers when logged in
//! - endpoints resolved against the configured base URL
//! - one timer per call; a call that outlives it is dropped and reported as a timeout
//! - 401 clears the session once and requests the login view
//! - everything else normalized into a [`CallOutcome`]

pub mod envelope;
pub mod query;
pub mod transport;


pub use envelope::{CallFailure, CallOutcome, Envelope, FailureKind, Payload};
pub use query::QueryParams;
pub use transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport, TransportError};

use crate::events::EventSink;
use crate::session::SessionStore;
use assetdesk_core::{ClientConfig, NoticeLevel, View};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Method, body and extra headers for one call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// JSON-encode `body`
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Uniform executor for backend calls
pub struct Gateway {
    base_url: String,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    events: EventSink,
}

impl Gateway {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        events: EventSink,
    ) -> Self {
        let base_url = config.resolve_base_url();
        info!(base_url = %base_url, timeout_ms = config.request_timeout_ms, "Request gateway ready");

        Self {
            base_url,
            timeout: config.request_timeout(),
            transport,
            session,
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Absolute URL for `endpoint`
    ///
    /// Absolute http(s) URLs pass through untouched; anything else is joined
    /// to the base URL with exactly one `/` between them.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if is_absolute(endpoint) {
            return endpoint.to_string();
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Execute one call and classify the result
    pub async fn call(&self, endpoint: &str, options: RequestOptions) -> CallOutcome {
        let (generation, identity) = self.session.identity_snapshot();
        match self.execute(endpoint, options, identity).await {
            Ok(envelope) if envelope.status == 401 => {
                self.expire_session(generation);
                CallOutcome::AuthExpired
            }
            Ok(envelope) => CallOutcome::Completed(envelope),
            Err(failure) => {
                self.events.notify(NoticeLevel::Error, failure.notice());
                CallOutcome::Failed(failure)
            }
        }
    }

    /// GET with a query string built from `params`
    pub async fn get(&self, endpoint: &str, params: &QueryParams) -> CallOutcome {
        self.call(&params.append_to(endpoint), RequestOptions::new(Method::GET))
            .await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> CallOutcome {
        self.send_json(Method::POST, endpoint, body).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> CallOutcome {
        self.send_json(Method::PUT, endpoint, body).await
    }

    pub async fn delete(&self, endpoint: &str) -> CallOutcome {
        self.call(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &T,
    ) -> CallOutcome {
        match RequestOptions::new(method).with_json(body) {
            Ok(options) => self.call(endpoint, options).await,
            Err(e) => {
                let failure = CallFailure::invalid_request(format!("Failed to encode body: {}", e));
                warn!(endpoint, error = %failure, "Request body could not be encoded");
                self.events.notify(NoticeLevel::Error, failure.notice());
                CallOutcome::Failed(failure)
            }
        }
    }

    /// Run the request under the call timer without any 401 or notice handling
    ///
    /// Used directly by login, where a 401 means "bad credentials" rather
    /// than "session expired".
    pub(crate) async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
        identity: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<Envelope, CallFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);
        for (name, value) in identity {
            headers.insert(name, value);
        }

        let request = OutboundRequest {
            method: options.method,
            url: self.resolve_url(endpoint),
            headers,
            body: options.body,
        };

        debug!("API Request: {} {}", request.method, request.url);

        // Dropping the send future on expiry aborts the in-flight request
        let raw = match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(endpoint, error = %e, "API request failed");
                return Err(CallFailure::network(e.message));
            }
            Err(_) => {
                warn!(
                    endpoint,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "API request timed out"
                );
                return Err(CallFailure::timeout());
            }
        };

        let envelope = Envelope::from_response(raw.status, raw.content_type.as_deref(), raw.body);
        debug!(status = envelope.status, data = ?envelope.data, "API Response");

        Ok(envelope)
    }

    fn expire_session(&self, generation: u64) {
        if self.session.expire(generation) {
            warn!("Backend rejected the session; returning to login");
            self.events
                .notify(NoticeLevel::Error, "Session expired. Please log in again.");
            self.events.navigate(View::Login);
        } else {
            debug!("Rejection already reported");
        }
    }
}

fn is_absolute(endpoint: &str) -> bool {
    url::Url::parse(endpoint)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
