use super::{RecordId, SystemFilters};
use crate::gateway::{CallOutcome, Gateway, QueryParams};
use serde::Serialize;
use std::sync::Arc;

/// Routes for managed systems (desktops, laptops, servers)
#[derive(Clone)]
pub struct SystemsApi {
    gateway: Arc<Gateway>,
}

impl SystemsApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// GET `/systems`; the records are under the `systems` key
    pub async fn list(&self, filters: &SystemFilters) -> CallOutcome {
        self.gateway.get("/systems", &filters.to_query()).await
    }

    pub async fn get(&self, id: RecordId) -> CallOutcome {
        self.gateway
            .get(&format!("/system/{}", id), &QueryParams::new())
            .await
    }

    pub async fn create<T: Serialize + ?Sized>(&self, system: &T) -> CallOutcome {
        self.gateway.post("/add-system", system).await
    }

    pub async fn update<T: Serialize + ?Sized>(&self, id: RecordId, system: &T) -> CallOutcome {
        self.gateway.put(&format!("/system/{}", id), system).await
    }

    pub async fn delete(&self, id: RecordId) -> CallOutcome {
        self.gateway.delete(&format!("/system/{}", id)).await
    }
}
