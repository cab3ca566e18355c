//! AssetDesk Client - session state and request gateway for the IT-asset backend
//!
//! This crate is the layer every front end sits on:
//!
//! - **Session store** ([`SessionStore`]): who the operator is, persisted
//!   across restarts
//! - **Request gateway** ([`Gateway`]): identity headers, per-call timeout,
//!   central 401 handling and normalized results
//! - **Resource APIs** ([`Api`]): typed routes for systems, peripherals,
//!   complaints, logs and report links
//! - **UI events** ([`UiEvent`]): notices and navigation requests for the
//!   embedding front end
//!
//! ## Wiring
//!
//! [`AssetDeskClient::from_config`] builds the whole stack over a file-backed
//! store and a `reqwest` transport. Tests and embedders with other needs can
//! assemble the pieces by hand.

pub mod api;
pub mod events;
pub mod gateway;
pub mod session;

#[cfg(test)]
mod testing;

pub use api::{
    Api, AuthApi, ComplaintFilters, ComplaintsApi, LogsApi, PeripheralsApi, RecordId, ReportUrls,
    SystemFilters, SystemsApi,
};
pub use events::{EventSink, NavigationHandle, Notice, UiEvent, UiEvents};
pub use gateway::{
    CallFailure, CallOutcome, Envelope, FailureKind, Gateway, OutboundRequest, Payload,
    QueryParams, RawResponse, ReqwestTransport, RequestOptions, Transport, TransportError,
};
pub use session::{
    Credentials, FileStore, Identity, KeyValueStore, LoginRejected, MemoryStore, Registration,
    SessionStore, USER_ID_HEADER, USER_ROLE_HEADER,
};

use assetdesk_core::{AssetDeskResult, ClientConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fully wired client: session, gateway and route wrappers sharing one event sink
#[derive(Clone)]
pub struct AssetDeskClient {
    session: Arc<SessionStore>,
    gateway: Arc<Gateway>,
    api: Api,
}

impl AssetDeskClient {
    /// Build the client over the configured session file and a real HTTP transport
    ///
    /// The returned receiver carries every notice and navigation request.
    pub fn from_config(config: &ClientConfig) -> AssetDeskResult<(Self, UiEvents)> {
        config.validate()?;

        let storage_path = config.storage_path();
        let storage = Arc::new(FileStore::open(&storage_path)?);
        info!(path = %storage_path.display(), "Using session file");

        let transport = Arc::new(ReqwestTransport::new(config)?);
        let (client, events) = Self::with_parts(config, storage, transport);
        Ok((client, events))
    }

    /// Build the client over caller-supplied storage and transport
    pub fn with_parts(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
    ) -> (Self, UiEvents) {
        let (sink, events) = EventSink::channel(Duration::from_millis(config.notice_duration_ms));
        let session = Arc::new(SessionStore::new(storage, config, sink.clone()));
        let gateway = Arc::new(Gateway::new(config, transport, session.clone(), sink));
        let api = Api::new(gateway.clone());

        (
            Self {
                session,
                gateway,
                api,
            },
            events,
        )
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Load the persisted session; see [`SessionStore::initialize`]
    pub fn initialize(&self) -> AssetDeskResult<Option<Identity>> {
        self.session.initialize()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, LoginRejected> {
        self.session.login(&self.gateway, credentials).await
    }

    pub fn logout(&self, redirect: bool) -> bool {
        self.session.logout(redirect)
    }
}
