use super::RecordId;
use crate::gateway::{CallOutcome, Gateway, QueryParams};
use serde::Serialize;
use std::sync::Arc;

/// Routes for peripherals attached to systems
#[derive(Clone)]
pub struct PeripheralsApi {
    gateway: Arc<Gateway>,
}

impl PeripheralsApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> CallOutcome {
        self.gateway.get("/peripherals", &QueryParams::new()).await
    }

    pub async fn create<T: Serialize + ?Sized>(&self, peripheral: &T) -> CallOutcome {
        self.gateway.post("/add-peripheral", peripheral).await
    }

    pub async fn update<T: Serialize + ?Sized>(&self, id: RecordId, peripheral: &T) -> CallOutcome {
        self.gateway
            .put(&format!("/peripheral/{}", id), peripheral)
            .await
    }

    pub async fn delete(&self, id: RecordId) -> CallOutcome {
        self.gateway.delete(&format!("/peripheral/{}", id)).await
    }
}
