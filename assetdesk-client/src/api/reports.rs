//! Report download links
//!
//! Reports are rendered by the backend and fetched by opening the URL; nothing
//! here touches the network.

use super::{ComplaintFilters, SystemFilters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUrls {
    base_url: String,
}

impl ReportUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn systems(&self, filters: &SystemFilters) -> String {
        filters
            .to_query()
            .append_to(&format!("{}/export-systems", self.base_url))
    }

    pub fn complaints(&self, filters: &ComplaintFilters) -> String {
        filters
            .to_query()
            .append_to(&format!("{}/export-complaints", self.base_url))
    }

    pub fn peripherals(&self) -> String {
        format!("{}/export/peripherals", self.base_url)
    }

    pub fn logs(&self) -> String {
        format!("{}/export-logs", self.base_url)
    }
}
