//! Account registration
//!
//! Login lives on [`SessionStore`](crate::session::SessionStore) because it
//! mutates the session; registration does not.

use crate::gateway::{CallOutcome, Gateway};
use crate::session::Registration;
use assetdesk_core::NoticeLevel;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<Gateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// POST `/register` and report the result as a notice
    ///
    /// Transport failures have already been announced by the gateway and get
    /// no second notice.
    pub async fn register(&self, registration: &Registration) -> CallOutcome {
        let outcome = self.gateway.post("/register", registration).await;
        let events = self.gateway.events();

        match &outcome {
            CallOutcome::Completed(envelope) if envelope.ok => {
                info!(email = %registration.email, role = %registration.role, "Registered account");
                events.notify(
                    NoticeLevel::Success,
                    "Registration successful! You can now log in.",
                );
            }
            CallOutcome::Completed(envelope) => {
                let message = envelope.error_message().unwrap_or("Registration failed");
                warn!(status = envelope.status, message, "Registration rejected");
                events.notify(NoticeLevel::Error, message);
            }
            CallOutcome::AuthExpired | CallOutcome::Failed(_) => {}
        }

        outcome
    }
}
