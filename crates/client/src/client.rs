use std::sync::{Arc, RwLock};

use serde_json::Value;
use workers_kit_core::{ClientConfig, Error, Result, Scope};

use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Cloudflare API client.
///
/// Holds the transport and the default scope. Defaults can be replaced at
/// runtime with [`Client::set_account_id`] / [`Client::set_zone_id`]; every
/// operation takes a snapshot of them when it starts, so a concurrent setter
/// never changes the scope of a call already in flight.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    defaults: Arc<RwLock<Scope>>,
}

/// Where an account-or-zone operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Account(String),
    Zone(String),
}

impl Client {
    /// Create a client talking HTTP to the configured endpoint
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config.default_scope()))
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>, defaults: Scope) -> Self {
        Self {
            transport,
            defaults: Arc::new(RwLock::new(defaults)),
        }
    }

    /// Replace the default account id
    pub fn set_account_id(&self, account_id: impl Into<String>) {
        let mut defaults = self.defaults.write().unwrap_or_else(|e| e.into_inner());
        defaults.account_id = Some(account_id.into());
    }

    /// Replace the default zone id
    pub fn set_zone_id(&self, zone_id: impl Into<String>) {
        let mut defaults = self.defaults.write().unwrap_or_else(|e| e.into_inner());
        defaults.zone_id = Some(zone_id.into());
    }

    /// Snapshot of the current default scope
    pub fn defaults(&self) -> Scope {
        self.defaults
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Explicit account id, else the default one
    pub(crate) fn account_id(&self, scope: &Scope) -> Result<String> {
        if let Some(account) = scope.account_id() {
            return Ok(account.to_string());
        }
        self.defaults()
            .account_id()
            .map(str::to_string)
            .ok_or(Error::MissingScope("an account ID"))
    }

    /// Explicit zone id, else the default one
    pub(crate) fn zone_id(&self, scope: &Scope) -> Result<String> {
        if let Some(zone) = scope.zone_id() {
            return Ok(zone.to_string());
        }
        self.defaults()
            .zone_id()
            .map(str::to_string)
            .ok_or(Error::MissingScope("a zone ID"))
    }

    /// Account or zone, in order: explicit account, explicit zone, default
    /// account, default zone. `None` if nothing resolves.
    pub(crate) fn target(&self, scope: &Scope) -> Option<Target> {
        let defaults = self.defaults();
        if let Some(account) = scope.account_id() {
            Some(Target::Account(account.to_string()))
        } else if let Some(zone) = scope.zone_id() {
            Some(Target::Zone(zone.to_string()))
        } else if let Some(account) = defaults.account_id() {
            Some(Target::Account(account.to_string()))
        } else {
            defaults.zone_id().map(|zone| Target::Zone(zone.to_string()))
        }
    }

    pub(crate) async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.transport.call(request).await
    }
}

/// Reject empty required arguments before anything is sent
pub(crate) fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Error::MissingArgument(field))
    } else {
        Ok(value)
    }
}
