//! Complaint tickets

use super::{ComplaintFilters, RecordId};
use crate::gateway::{CallOutcome, Gateway};
use assetdesk_core::Role;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ComplaintsApi {
    gateway: Arc<Gateway>,
}

impl ComplaintsApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// GET `/complaints` with exactly the given filters
    pub async fn list(&self, filters: &ComplaintFilters) -> CallOutcome {
        self.gateway.get("/complaints", &filters.to_query()).await
    }

    /// GET `/complaints` restricted to what the current operator may see
    ///
    /// Operators with the `User` role only see their own complaints, so
    /// `user_id` is forced to their id whatever the caller asked for.
    pub async fn list_visible(&self, filters: &ComplaintFilters) -> CallOutcome {
        self.list(&self.visible_filters(filters)).await
    }

    pub(crate) fn visible_filters(&self, filters: &ComplaintFilters) -> ComplaintFilters {
        let session = self.gateway.session();
        let mut scoped = filters.clone();
        if session.has_role(Role::User) {
            if let Some(identity) = session.current() {
                debug!(user_id = %identity.user_id, "Scoping complaints to the current operator");
                scoped.user_id = Some(identity.user_id);
            }
        }
        scoped
    }

    pub async fn create<T: Serialize + ?Sized>(&self, complaint: &T) -> CallOutcome {
        self.gateway.post("/add-complaint", complaint).await
    }

    pub async fn update<T: Serialize + ?Sized>(&self, id: RecordId, complaint: &T) -> CallOutcome {
        self.gateway
            .put(&format!("/complaint/{}", id), complaint)
            .await
    }
}
