//! Operator identity and login payloads

use assetdesk_core::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The currently authenticated operator
///
/// All four fields are present together; "logged out" is the absence of an
/// `Identity`, never a partially filled one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Role string exactly as the backend returned it
    pub role: String,
}

impl Identity {
    /// Parsed role, if the stored string is one the client knows
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Login form contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration form contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<u32>,
}

/// Successful `/login` bodies come in two shapes depending on backend version
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginBody {
    Nested {
        user: NestedUser,
    },
    Flat {
        user_id: Value,
        full_name: String,
        email: String,
        role: String,
    },
}

#[derive(Debug, Deserialize)]
struct NestedUser {
    id: Value,
    name: String,
    email: String,
    role: String,
}

/// Extract the operator identity from a successful `/login` response body
pub(crate) fn identity_from_login(data: &Value) -> Option<Identity> {
    let body = LoginBody::deserialize(data).ok()?;
    let (id, name, email, role) = match body {
        LoginBody::Nested { user } => (user.id, user.name, user.email, user.role),
        LoginBody::Flat {
            user_id,
            full_name,
            email,
            role,
        } => (user_id, full_name, email, role),
    };

    let user_id = match id {
        Value::String(s) if !s.is_empty() => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Some(Identity {
        user_id,
        name,
        email,
        role,
    })
}
