use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account and/or zone under which an API call runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

impl Scope {
    pub fn account(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            zone_id: None,
        }
    }

    pub fn zone(zone_id: impl Into<String>) -> Self {
        Self {
            account_id: None,
            zone_id: Some(zone_id.into()),
        }
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_zone(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    /// Account id, ignoring empty strings
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Zone id, ignoring empty strings
    pub fn zone_id(&self) -> Option<&str> {
        self.zone_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Workers KV namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_url_encoding: Option<bool>,
}

/// Entry of a namespace key listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub name: String,
    /// Unix timestamp after which the key expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Value,
}

/// Route binding a URL pattern to a named script (multi-script zones)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// Filter toggling the zone's single script on a URL pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub pattern: String,
    #[serde(default)]
    pub enabled: bool,
}

/// `{code, message}` entry of an envelope's `errors` or `messages` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Uniform wrapper around every Cloudflare API response.
///
/// `result` is only meaningful when `success` is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<ApiMessage>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<ApiMessage>,
}

impl Envelope {
    /// Build an envelope from a decoded response body.
    ///
    /// Bodies that are not envelope-shaped (a bare string, an array, an object
    /// with malformed fields) become an unsuccessful envelope carrying the body
    /// as `result`, so nothing the server sent is lost.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<Envelope>(value.clone()) {
            Ok(envelope) if value.is_object() => envelope,
            _ => Envelope {
                success: false,
                result: Some(value),
                errors: Vec::new(),
                messages: Vec::new(),
            },
        }
    }

    pub fn first_error(&self) -> Option<&ApiMessage> {
        self.errors.first()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ApiMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ApiMessage>>::deserialize(deserializer)?.unwrap_or_default())
}
