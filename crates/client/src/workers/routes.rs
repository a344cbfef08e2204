// Routes bind URL patterns to named scripts in multi-script zones

use serde_json::json;
use workers_kit_core::{Envelope, Error, Result, Route, Scope};

use crate::client::{Client, require};
use crate::envelope::{self, Outcome};
use crate::resolver::find_first;
use crate::transport::ApiRequest;

fn routes_path(zone_id: &str) -> String {
    format!("/zones/{}/workers/routes", zone_id)
}

impl Client {
    pub async fn list_routes(&self, scope: &Scope) -> Result<Outcome<Vec<Route>>> {
        let zone = self.zone_id(scope)?;
        envelope::unwrap(self.send(ApiRequest::get(routes_path(&zone))).await?)
    }

    /// Route requests matching `pattern` to `script`
    pub async fn add_route(&self, scope: &Scope, pattern: &str, script: &str) -> Result<Envelope> {
        let zone = self.zone_id(scope)?;
        let pattern = require(pattern, "a route pattern")?;
        let script = require(script, "a script name")?;

        let request = ApiRequest::post(routes_path(&zone))
            .json(&json!({ "pattern": pattern, "script": script }))?;
        Ok(envelope::raw(self.send(request).await?))
    }

    /// Delete a route by id; see [`Client::find_route`] to look one up by pattern
    pub async fn remove_route(&self, scope: &Scope, route_id: &str) -> Result<Envelope> {
        let zone = self.zone_id(scope)?;
        let route_id = require(route_id, "a route ID")?;

        let response = self
            .send(ApiRequest::delete(format!("{}/{}", routes_path(&zone), route_id)))
            .await?;
        Ok(envelope::raw(response))
    }

    /// First route whose pattern equals `pattern`; a failed listing is
    /// [`Error::Rejected`]
    pub async fn find_route(&self, scope: &Scope, pattern: &str) -> Result<Route> {
        let pattern = require(pattern, "a route pattern")?;
        let routes = self.list_routes(scope).await?.into_result_or_default()?;
        find_first(routes, |route| route.pattern == pattern)
            .ok_or_else(|| Error::NotFound(format!("Route '{}'", pattern)))
    }
}
