//! Typed wrappers for the backend routes
//!
//! Each wrapper is a thin, cheaply clonable handle over the shared
//! [`Gateway`]; they add route names and filter types, nothing else. Bodies
//! are passed through as anything `Serialize`, since record layouts belong to
//! the backend.

use crate::gateway::{Gateway, QueryParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod auth;
pub mod complaints;
pub mod logs;
pub mod peripherals;
pub mod reports;
pub mod systems;


pub use auth::AuthApi;
pub use complaints::ComplaintsApi;
pub use logs::LogsApi;
pub use peripherals::PeripheralsApi;
pub use reports::ReportUrls;
pub use systems::SystemsApi;

/// Numeric record identifier used in `/system/{id}`-style routes
pub type RecordId = u64;

/// Filters for the systems list and its export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFilters {
    pub department_id: Option<RecordId>,
    pub network_id: Option<RecordId>,
}

impl SystemFilters {
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("department_id", self.department_id)
            .with_opt("network_id", self.network_id)
    }
}

/// Filters for the complaints list and its export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintFilters {
    /// `Open`, `In Progress`, `Resolved`, ...
    pub status: Option<String>,
    pub priority: Option<String>,
    pub user_id: Option<String>,
}

impl ComplaintFilters {
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("status", self.status.as_deref())
            .with_opt("priority", self.priority.as_deref())
            .with_opt("user_id", self.user_id.as_deref())
    }
}

/// Entry point bundling every route wrapper over one gateway
#[derive(Clone)]
pub struct Api {
    gateway: Arc<Gateway>,
}

impl Api {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.gateway.clone())
    }

    pub fn systems(&self) -> SystemsApi {
        SystemsApi::new(self.gateway.clone())
    }

    pub fn peripherals(&self) -> PeripheralsApi {
        PeripheralsApi::new(self.gateway.clone())
    }

    pub fn complaints(&self) -> ComplaintsApi {
        ComplaintsApi::new(self.gateway.clone())
    }

    pub fn logs(&self) -> LogsApi {
        LogsApi::new(self.gateway.clone())
    }

    pub fn reports(&self) -> ReportUrls {
        ReportUrls::new(self.gateway.base_url())
    }
}
