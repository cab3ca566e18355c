//! Query-string construction

use serde::Serialize;
use serde_json::Value;

/// Ordered, flat key-value parameter set
///
/// Parameters whose value is absent or empty are dropped when the query
/// string is built; everything else is percent-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), Some(value.to_string())));
        self
    }

    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.pairs.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Set `key`, replacing any earlier value for it
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        self.pairs.retain(|(k, _)| *k != key);
        self.pairs.push((key, Some(value.to_string())));
    }

    /// Flatten any value that serializes to a JSON object
    ///
    /// `null` fields count as absent. Nested arrays and objects are sent as
    /// their JSON text.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let Value::Object(map) = serde_json::to_value(value)? else {
            return Err(serde::ser::Error::custom(
                "query parameters must serialize to an object",
            ));
        };

        let pairs = map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                };
                (key, value)
            })
            .collect();

        Ok(Self { pairs })
    }

    pub fn is_empty(&self) -> bool {
        self.to_query_string().is_empty()
    }

    /// `a=1&b=two` with absent and empty values skipped
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .filter_map(|(key, value)| match value {
                Some(value) if !value.is_empty() => Some(format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `endpoint?query`, or `endpoint` unchanged when nothing survives filtering
    pub fn append_to(&self, endpoint: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query)
        }
    }
}
