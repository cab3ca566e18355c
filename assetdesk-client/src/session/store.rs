//! Session store - who the current operator is
//!
//! Holds the operator identity in memory and mirrors it into a
//! [`KeyValueStore`] so it survives restarts. One store is shared (as an
//! `Arc`) by the gateway and every API wrapper.

use super::identity::{identity_from_login, Credentials, Identity};
use super::storage::KeyValueStore;
use crate::events::{EventSink, NavigationHandle, UiEvent};
use crate::gateway::{Gateway, RequestOptions};
use assetdesk_core::{AssetDeskResult, ClientConfig, NoticeLevel, StorageKeys, View};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Login was not accepted; the store is unchanged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoginRejected {
    pub message: String,
}

impl LoginRejected {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    current: RwLock<Option<Identity>>,
    /// Bumped under the write lock whenever `current` changes
    generation: AtomicU64,
    /// Set once a rejected call has been reported; cleared by the next login
    expiry_reported: AtomicBool,
    events: EventSink,
    redirect_delay: Duration,
    pending_navigation: Mutex<Option<NavigationHandle>>,
}

impl SessionStore {
    /// Create an empty store; call [`initialize`](Self::initialize) to load the persisted session
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &ClientConfig, events: EventSink) -> Self {
        Self {
            storage,
            keys: config.storage.keys.clone(),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            expiry_reported: AtomicBool::new(false),
            events,
            redirect_delay: config.logout_redirect_delay(),
            pending_navigation: Mutex::new(None),
        }
    }

    /// Load the persisted identity
    ///
    /// Without a stored identifier the login view is requested and `None`
    /// returned. An identifier without its companion fields is residue from an
    /// interrupted write and is discarded the same way.
    pub fn initialize(&self) -> AssetDeskResult<Option<Identity>> {
        let loaded = self.read_persisted()?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = loaded.clone();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if loaded.is_some() {
            self.expiry_reported.store(false, Ordering::SeqCst);
        }
        drop(current);

        match &loaded {
            Some(identity) => {
                info!(user_id = %identity.user_id, role = %identity.role, "Session restored");
                self.events.emit(UiEvent::SessionChanged(loaded.clone()));
            }
            None => {
                debug!("No stored session; requesting login");
                self.events.navigate(View::Login);
            }
        }

        Ok(loaded)
    }

    fn read_persisted(&self) -> AssetDeskResult<Option<Identity>> {
        let Some(user_id) = self.storage.get(&self.keys.user_id)? else {
            return Ok(None);
        };

        let name = self.storage.get(&self.keys.user_name)?;
        let email = self.storage.get(&self.keys.user_email)?;
        let role = self.storage.get(&self.keys.user_role)?;

        match (name, email, role) {
            (Some(name), Some(email), Some(role)) if !user_id.is_empty() => Ok(Some(Identity {
                user_id,
                name,
                email,
                role,
            })),
            _ => {
                warn!("Discarding incomplete stored session");
                self.clear_persisted();
                Ok(None)
            }
        }
    }

    /// Authenticate against the backend and, on success, persist the identity
    ///
    /// All failures come back as [`LoginRejected`]; nothing is raised.
    pub async fn login(
        &self,
        gateway: &Gateway,
        credentials: &Credentials,
    ) -> Result<Identity, LoginRejected> {
        let options = match RequestOptions::new(Method::POST).with_json(credentials) {
            Ok(options) => options,
            Err(e) => {
                error!(error = %e, "Failed to encode credentials");
                return Err(self.reject("Login failed. Please try again."));
            }
        };

        let envelope = match gateway.execute("/login", options, Vec::new()).await {
            Ok(envelope) => envelope,
            Err(failure) => {
                warn!(error = %failure, "Login request failed");
                return Err(self.reject("Login failed. Please try again."));
            }
        };

        if !envelope.ok {
            let message = envelope.error_message().unwrap_or("Login failed").to_string();
            info!(status = envelope.status, "Login rejected by backend");
            return Err(self.reject(message));
        }

        let Some(identity) = envelope.json().and_then(identity_from_login) else {
            warn!("Login response carried no usable identity");
            return Err(self.reject("Invalid response from server"));
        };

        if let Err(e) = self.establish(&identity) {
            e.log();
            return Err(self.reject("Login failed. Please try again."));
        }

        info!(user_id = %identity.user_id, role = %identity.role, "Logged in");
        self.events.notify(NoticeLevel::Success, "Login successful!");
        self.events
            .emit(UiEvent::SessionChanged(Some(identity.clone())));
        Ok(identity)
    }

    fn reject(&self, message: impl Into<String>) -> LoginRejected {
        let rejected = LoginRejected::new(message);
        self.events.notify(NoticeLevel::Error, rejected.message.clone());
        rejected
    }

    /// Persist all four fields, then publish the identity in memory
    ///
    /// A failed write puts the previous session back in storage. If that
    /// fails as well, the session is dropped in memory too.
    pub(crate) fn establish(&self, identity: &Identity) -> AssetDeskResult<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = self.persist(identity) {
            let restored = match current.as_ref() {
                Some(previous) => self.persist(previous).is_ok(),
                None => false,
            };
            if !restored {
                self.clear_persisted();
                if current.take().is_some() {
                    self.generation.fetch_add(1, Ordering::SeqCst);
                    warn!("Previous session could not be restored; logged out");
                    self.events.emit(UiEvent::SessionChanged(None));
                }
            }
            return Err(e);
        }

        *current = Some(identity.clone());
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.expiry_reported.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn persist(&self, identity: &Identity) -> AssetDeskResult<()> {
        let fields = [
            (&self.keys.user_id, &identity.user_id),
            (&self.keys.user_name, &identity.name),
            (&self.keys.user_email, &identity.email),
            (&self.keys.user_role, &identity.role),
        ];
        for (key, value) in fields {
            self.storage.set(key, value)?;
        }
        Ok(())
    }

    /// Clear the session in memory and in storage
    ///
    /// Returns `true` only for the call that actually ended an active
    /// session; later calls (including concurrent ones) are no-ops. With
    /// `redirect`, a notice is shown and the login view requested after the
    /// configured delay.
    pub fn logout(&self, redirect: bool) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let Some(previous) = current.take() else {
            return false;
        };
        self.clear_persisted();
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(current);

        info!(user_id = %previous.user_id, redirect, "Logged out");
        self.events.emit(UiEvent::SessionChanged(None));

        if redirect {
            self.events
                .notify(NoticeLevel::Success, "You have been logged out.");
            let handle = self
                .events
                .navigate_after(View::Login, self.redirect_delay);
            let mut pending = self
                .pending_navigation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(stale) = pending.replace(handle) {
                stale.cancel();
            }
        }

        true
    }

    /// Handle a backend rejection of a call sent under session `generation`
    ///
    /// Clears the session when it is still the one the call was sent with;
    /// a newer session is left alone. Returns `true` when the rejection
    /// should be reported, which happens once until the next login.
    pub(crate) fn expire(&self, generation: u64) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Ignoring rejection of a replaced session");
            return false;
        }

        let cleared = current.take();
        if cleared.is_some() {
            self.clear_persisted();
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        drop(current);

        if let Some(previous) = cleared {
            info!(user_id = %previous.user_id, "Session expired");
            self.events.emit(UiEvent::SessionChanged(None));
        }

        !self.expiry_reported.swap(true, Ordering::SeqCst)
    }

    fn clear_persisted(&self) {
        for key in self.keys.all() {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to clear stored session field");
            }
        }
    }

    /// Cancel any scheduled navigation; the in-memory session is left as is
    pub fn teardown(&self) {
        let mut pending = self
            .pending_navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.cancel();
        }
    }

    /// Wait for the navigation scheduled by a redirecting logout, if any
    pub async fn wait_for_navigation(&self) {
        let handle = self
            .pending_navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.wait().await;
        }
    }

    pub fn current(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Exact, case-sensitive match against the stored role
    pub fn has_role(&self, role: impl AsRef<str>) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|identity| identity.role == role.as_ref())
    }

    /// `X-User-ID` / `X-User-Role` for the current operator; empty when logged out
    pub fn identity_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        self.identity_snapshot().1
    }

    /// Session generation together with the identity headers it produces
    pub(crate) fn identity_snapshot(&self) -> (u64, Vec<(HeaderName, HeaderValue)>) {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.load(Ordering::SeqCst);
        let Some(identity) = current.as_ref() else {
            return (generation, Vec::new());
        };

        let mut headers = Vec::with_capacity(2);
        for (name, value) in [
            (USER_ID_HEADER, &identity.user_id),
            (USER_ROLE_HEADER, &identity.role),
        ] {
            match HeaderValue::from_str(value) {
                Ok(value) => headers.push((HeaderName::from_static(name), value)),
                Err(e) => warn!(header = name, error = %e, "Identity value is not a valid header"),
            }
        }
        (generation, headers)
    }

    /// Full header set for an authenticated JSON request
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in self.identity_headers() {
            headers.insert(name, value);
        }
        headers
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("keys", &self.keys)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
