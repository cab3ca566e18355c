//! Client configuration

use crate::error::{AssetDeskError, AssetDeskResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Host used when the client runs without a usable page origin
pub const FALLBACK_API_URL: &str = "http://10.1.0.211:8000";

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Explicit backend URL; takes precedence over origin detection
    pub api_url: Option<String>,
    /// Origin of the page or host embedding the client, if any
    pub page_origin: Option<String>,
    /// Backend used for local-file origins
    pub fallback_api_url: String,
    /// Per-call timeout in milliseconds
    pub request_timeout_ms: u64,
    /// How long a notice should stay visible in milliseconds
    pub notice_duration_ms: u64,
    /// Delay between the logout notice and the navigation to the login view
    pub logout_redirect_delay_ms: u64,
    /// User agent sent on every request
    pub user_agent: String,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

/// Durable session storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Session file path; defaults to the platform data directory
    pub path: Option<String>,
    pub keys: StorageKeys,
}

/// Namespaced keys the session fields are persisted under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_role: String,
}

/// Pagination defaults for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when none is requested
    pub items_per_page: usize,
    /// Page sizes an operator may pick from
    pub page_sizes: Vec<usize>,
}

/// Position of one page within a list of `total_items`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number, clamped to the last page
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
}

impl PageWindow {
    /// Number of pages; an empty list still has one (empty) page
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page).max(1)
    }

    /// Indices of the items on this page
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.per_page).min(self.total_items);
        let end = (start + self.per_page).min(self.total_items);
        start..end
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            page_origin: None,
            fallback_api_url: FALLBACK_API_URL.to_string(),
            request_timeout_ms: 30_000,
            notice_duration_ms: 3_000,
            logout_redirect_delay_ms: 1_000,
            user_agent: format!("assetdesk/{}", env!("CARGO_PKG_VERSION")),
            storage: StorageConfig::default(),
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            keys: StorageKeys::default(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            user_id: "it_mgmt_user_id".to_string(),
            user_name: "it_mgmt_user_name".to_string(),
            user_email: "it_mgmt_user_email".to_string(),
            user_role: "it_mgmt_user_role".to_string(),
        }
    }
}

impl StorageKeys {
    pub fn all(&self) -> [&str; 4] {
        [
            &self.user_id,
            &self.user_name,
            &self.user_email,
            &self.user_role,
        ]
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            items_per_page: 10,
            page_sizes: vec![5, 10, 25, 50],
        }
    }
}

impl PaginationConfig {
    /// Window for `page` of a list with `total_items` entries
    ///
    /// `per_page` defaults to `items_per_page`; an explicit size must be one
    /// of `page_sizes`. Pages past the end show the last page.
    pub fn window(
        &self,
        page: usize,
        per_page: Option<usize>,
        total_items: usize,
    ) -> AssetDeskResult<PageWindow> {
        if page == 0 {
            return Err(crate::validation_error!(
                "page numbers start at 1",
                "page",
                "pagination"
            ));
        }

        let per_page = match per_page {
            None => self.items_per_page,
            Some(size) if size == self.items_per_page || self.page_sizes.contains(&size) => size,
            Some(size) => {
                return Err(crate::validation_error!(
                    format!("page size {} is not one of {:?}", size, self.page_sizes),
                    "per_page",
                    "pagination"
                ))
            }
        };

        let mut window = PageWindow {
            page,
            per_page,
            total_items,
        };
        window.page = page.min(window.total_pages());
        Ok(window)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AssetDeskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AssetDeskError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ClientConfig = toml::from_str(&content).map_err(|e| AssetDeskError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AssetDeskResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| AssetDeskError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| AssetDeskError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> AssetDeskResult<()> {
        if self.request_timeout_ms == 0 {
            return Err(crate::validation_error!(
                "request_timeout_ms must be greater than 0",
                "request_timeout_ms",
                "config"
            ));
        }

        if self.pagination.items_per_page == 0 {
            return Err(crate::validation_error!(
                "items_per_page must be greater than 0",
                "pagination.items_per_page",
                "config"
            ));
        }

        if self.pagination.page_sizes.contains(&0) {
            return Err(crate::validation_error!(
                "page sizes must be greater than 0",
                "pagination.page_sizes",
                "config"
            ));
        }

        if self.logging.log_to_file && self.logging.log_file_path.is_none() {
            return Err(crate::config_error!(
                "logging.log_file_path must be set when logging.log_to_file is true",
                "config"
            ));
        }

        let keys = self.storage.keys.all();
        if keys.iter().any(|key| key.is_empty()) {
            return Err(crate::validation_error!(
                "storage keys must not be empty",
                "storage.keys",
                "config"
            ));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                return Err(crate::validation_error!(
                    format!("storage key '{}' is used twice", key),
                    "storage.keys",
                    "config"
                ));
            }
        }

        let base_url = self.resolve_base_url();
        url::Url::parse(&base_url).map_err(|e| AssetDeskError::Config {
            message: format!("Invalid backend URL '{}': {}", base_url, e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Set api_url to an absolute http(s) URL"),
        })?;

        Ok(())
    }

    /// Backend base URL, without a trailing slash
    ///
    /// An explicit `api_url` wins. Otherwise a missing or `file://` origin
    /// falls back to the hardcoded host and any other origin is reused.
    pub fn resolve_base_url(&self) -> String {
        let resolved = match (&self.api_url, &self.page_origin) {
            (Some(api_url), _) => api_url.as_str(),
            (None, Some(origin)) if !origin.starts_with("file://") && origin != "null" => {
                origin.as_str()
            }
            _ => self.fallback_api_url.as_str(),
        };
        resolved.trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }

    pub fn logout_redirect_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.logout_redirect_delay_ms)
    }

    /// Location of the durable session file
    pub fn storage_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return expand_home(path);
        }

        dirs::data_local_dir()
            .map(|d| d.join("assetdesk"))
            .unwrap_or_else(|| PathBuf::from(".assetdesk"))
            .join("session.json")
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
