use crate::gateway::{CallOutcome, Gateway, QueryParams};
use std::sync::Arc;

/// Audit log access
#[derive(Clone)]
pub struct LogsApi {
    gateway: Arc<Gateway>,
}

impl LogsApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// GET `/logs`; the backend decides which filter keys it honors
    pub async fn list(&self, filters: &QueryParams) -> CallOutcome {
        self.gateway.get("/logs", filters).await
    }
}
