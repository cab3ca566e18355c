//! Normalized call results

use serde::Serialize;
use serde_json::{json, Value};

/// Parsed response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}

/// Result shape every completed call produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Transport succeeded and the status was 2xx
    pub ok: bool,
    /// HTTP status, or 0 when no response arrived
    pub status: u16,
    pub data: Payload,
    pub timeout: bool,
    pub network_error: bool,
}

impl Envelope {
    /// Build an envelope from a received response
    ///
    /// Bodies declared as JSON are parsed as JSON; anything else, including
    /// JSON that fails to parse, is kept as text.
    pub fn from_response(status: u16, content_type: Option<&str>, body: String) -> Self {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        let data = if is_json {
            match serde_json::from_str(&body) {
                Ok(value) => Payload::Json(value),
                Err(e) => {
                    tracing::warn!(status, error = %e, "Response declared JSON but did not parse");
                    Payload::Text(body)
                }
            }
        } else {
            Payload::Text(body)
        };

        Self {
            ok: (200..300).contains(&status),
            status,
            data,
            timeout: false,
            network_error: false,
        }
    }

    pub fn json(&self) -> Option<&Value> {
        self.data.as_json()
    }

    /// Top-level field of a JSON body, e.g. `systems` in `{"systems": [...]}`
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.json()?.get(name)
    }

    /// Server-supplied `error` message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.field("error")?.as_str()
    }
}

/// Why a call produced no response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The timer fired before the call completed; the call was aborted
    Timeout,
    /// DNS, connection refused, reset, TLS and similar
    Network,
    /// The request could not be built (bad header, unserializable body)
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CallFailure {
    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: "Request timed out".to_string(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidRequest,
            message: message.into(),
        }
    }

    /// Text of the notice shown for this failure
    pub fn notice(&self) -> &'static str {
        match self.kind {
            FailureKind::Timeout => "Request timed out. Please try again.",
            FailureKind::Network => "Network error. Please check your connection.",
            FailureKind::InvalidRequest => "Request could not be sent.",
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope {
            ok: false,
            status: 0,
            data: Payload::Json(json!({ "error": self.message })),
            timeout: self.kind == FailureKind::Timeout,
            network_error: self.kind == FailureKind::Network,
        }
    }
}

/// Terminal state of one gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// A response arrived (any status other than 401)
    Completed(Envelope),
    /// The backend answered 401; the session has been cleared and the login
    /// view requested. There is nothing for the caller to process.
    AuthExpired,
    /// No response arrived
    Failed(CallFailure),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Completed(envelope) if envelope.ok)
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            CallOutcome::Completed(envelope) => Some(envelope),
            _ => None,
        }
    }

    /// Envelope view of the outcome; `None` only for `AuthExpired`
    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            CallOutcome::Completed(envelope) => Some(envelope),
            CallOutcome::Failed(failure) => Some(failure.to_envelope()),
            CallOutcome::AuthExpired => None,
        }
    }

    /// Message suitable for showing to an operator when the call did not succeed
    pub fn error_message(&self, fallback: &str) -> Option<String> {
        match self {
            CallOutcome::Completed(envelope) if envelope.ok => None,
            CallOutcome::Completed(envelope) => Some(
                envelope
                    .error_message()
                    .unwrap_or(fallback)
                    .to_string(),
            ),
            CallOutcome::Failed(failure) => Some(failure.message.clone()),
            CallOutcome::AuthExpired => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_and_text_bodies() {
        let envelope = Envelope::from_response(
            200,
            Some("application/json; charset=utf-8"),
            r#"{"systems": []}"#.to_string(),
        );
        assert!(envelope.ok);
        assert_eq!(envelope.field("systems"), Some(&json!([])));

        let envelope = Envelope::from_response(404, Some("text/html"), "File not found".to_string());
        assert!(!envelope.ok);
        assert_eq!(envelope.data, Payload::Text("File not found".to_string()));
        assert_eq!(envelope.error_message(), None);
    }

    #[test]
    fn test_malformed_json_falls_back_to_text() {
        let envelope = Envelope::from_response(500, Some("application/json"), "oops".to_string());
        assert_eq!(envelope.data, Payload::Text("oops".to_string()));
    }

    #[test]
    fn test_failure_envelopes() {
        let envelope = CallFailure::timeout().to_envelope();
        assert!(!envelope.ok);
        assert_eq!(envelope.status, 0);
        assert!(envelope.timeout);
        assert!(!envelope.network_error);
        assert_eq!(envelope.error_message(), Some("Request timed out"));

        let envelope = CallFailure::network("connection refused").to_envelope();
        assert!(envelope.network_error);
        assert_eq!(envelope.error_message(), Some("connection refused"));
    }

    #[test]
    fn test_outcome_error_message() {
        let rejected = CallOutcome::Completed(Envelope::from_response(
            400,
            Some("application/json"),
            r#"{"error": "Missing required fields"}"#.to_string(),
        ));
        assert_eq!(
            rejected.error_message("Failed to save").as_deref(),
            Some("Missing required fields")
        );

        let bare = CallOutcome::Completed(Envelope::from_response(500, None, String::new()));
        assert_eq!(bare.error_message("Failed to save").as_deref(), Some("Failed to save"));

        assert_eq!(CallOutcome::AuthExpired.error_message("x"), None);
        assert_eq!(CallOutcome::AuthExpired.into_envelope(), None);
    }
}
