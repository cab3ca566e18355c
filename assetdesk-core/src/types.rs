//! Core data type definitions

use serde::{Deserialize, Serialize};

/// Operator roles known to the backend
///
/// The wire form is the exact string the backend stores; comparisons against
/// it are case-sensitive and there is no hierarchy between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "IT_Personnel")]
    ItPersonnel,
    #[serde(rename = "User")]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::ItPersonnel, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::ItPersonnel => "IT_Personnel",
            Role::User => "User",
        }
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// Views a front end can be asked to navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Login,
    Dashboard,
}

impl View {
    /// Page the web front end serves for this view
    pub fn page(&self) -> &'static str {
        match self {
            View::Login => "login.html",
            View::Dashboard => "index.html",
        }
    }
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}
