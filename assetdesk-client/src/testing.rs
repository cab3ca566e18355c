//! Test doubles shared by the unit tests

use crate::events::{EventSink, UiEvent, UiEvents};
use crate::gateway::{Gateway, OutboundRequest, RawResponse, Transport, TransportError};
use crate::session::{Identity, MemoryStore, SessionStore};
use assetdesk_core::ClientConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const BASE_URL: &str = "http://backend.test";

/// What the mock backend does with a request
pub(crate) enum Reply {
    Json(u16, Value),
    Text(u16, &'static str),
    Fail(&'static str),
    /// Answer only after the delay (long enough to trip the call timer)
    Slow(Duration, u16, Value),
}

type Handler = Box<dyn Fn(&OutboundRequest) -> Reply + Send + Sync>;

pub(crate) struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub(crate) fn new(handler: impl Fn(&OutboundRequest) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> OutboundRequest {
        self.requests().pop().expect("no request was sent")
    }
}

fn json_response(status: u16, value: Value) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: value.to_string(),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match (self.handler)(&request) {
            Reply::Json(status, value) => Ok(json_response(status, value)),
            Reply::Text(status, body) => Ok(RawResponse {
                status,
                content_type: Some("text/plain".to_string()),
                body: body.to_string(),
            }),
            Reply::Fail(message) => Err(TransportError::new(message)),
            Reply::Slow(delay, status, value) => {
                tokio::time::sleep(delay).await;
                Ok(json_response(status, value))
            }
        }
    }
}

/// Gateway wired to a mock backend, in-memory storage and a live event channel
pub(crate) struct Harness {
    pub gateway: Arc<Gateway>,
    pub session: Arc<SessionStore>,
    pub storage: Arc<MemoryStore>,
    pub transport: Arc<MockTransport>,
    pub events: UiEvents,
}

impl Harness {
    pub(crate) fn new(handler: impl Fn(&OutboundRequest) -> Reply + Send + Sync + 'static) -> Self {
        let config = test_config();
        let storage = Arc::new(MemoryStore::new());
        let (sink, events) = EventSink::channel(Duration::from_millis(config.notice_duration_ms));
        let session = Arc::new(SessionStore::new(storage.clone(), &config, sink.clone()));
        let transport = MockTransport::new(handler);
        let gateway = Arc::new(Gateway::new(
            &config,
            transport.clone(),
            session.clone(),
            sink,
        ));

        Self {
            gateway,
            session,
            storage,
            transport,
            events,
        }
    }

    /// Put an operator in the session without talking to the backend
    pub(crate) fn sign_in(&self, role: &str) -> Identity {
        let identity = operator(role);
        self.session.establish(&identity).unwrap();
        identity
    }

    pub(crate) fn drain_events(&mut self) -> Vec<UiEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

pub(crate) fn test_config() -> ClientConfig {
    ClientConfig {
        api_url: Some(BASE_URL.to_string()),
        request_timeout_ms: 100,
        logout_redirect_delay_ms: 10,
        ..Default::default()
    }
}

pub(crate) fn operator(role: &str) -> Identity {
    Identity {
        user_id: "7".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        role: role.to_string(),
    }
}

pub(crate) fn header<'a>(request: &'a OutboundRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

pub(crate) fn navigations(events: &[UiEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, UiEvent::Navigate(_)))
        .count()
}

pub(crate) fn notices(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            UiEvent::Notice(notice) => Some(notice.message.clone()),
            _ => None,
        })
        .collect()
}
