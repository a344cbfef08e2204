// Filters switch the zone's single script on or off per URL pattern

use serde_json::json;
use tracing::{info, warn};
use workers_kit_core::{Envelope, Error, Filter, Result, Scope};

use crate::client::{Client, require};
use crate::envelope::{self, Outcome};
use crate::resolver::find_first;
use crate::transport::ApiRequest;

fn filters_path(zone_id: &str) -> String {
    format!("/zones/{}/workers/filters", zone_id)
}

impl Client {
    pub async fn list_filters(&self, scope: &Scope) -> Result<Outcome<Vec<Filter>>> {
        let zone = self.zone_id(scope)?;
        envelope::unwrap(self.send(ApiRequest::get(filters_path(&zone))).await?)
    }

    /// Enable the zone script for `pattern`
    pub async fn add_filter(&self, scope: &Scope, pattern: &str) -> Result<Envelope> {
        let zone = self.zone_id(scope)?;
        let pattern = require(pattern, "a filter pattern")?;

        let request = ApiRequest::post(filters_path(&zone))
            .json(&json!({ "pattern": pattern, "enabled": true }))?;
        Ok(envelope::raw(self.send(request).await?))
    }

    pub async fn remove_filter(&self, scope: &Scope, filter_id: &str) -> Result<Envelope> {
        let zone = self.zone_id(scope)?;
        let filter_id = require(filter_id, "a filter ID")?;

        let response = self
            .send(ApiRequest::delete(format!("{}/{}", filters_path(&zone), filter_id)))
            .await?;
        Ok(envelope::raw(response))
    }

    /// Remove every filter of the zone, one at a time.
    ///
    /// Returns one envelope per removal in listing order. A failed listing is
    /// [`Error::Rejected`]; failed removals are reported in their envelopes.
    /// Listed filters without an id cannot be removed and are logged.
    pub async fn remove_all_filters(&self, scope: &Scope) -> Result<Vec<Envelope>> {
        let zone = self.zone_id(scope)?;
        let filters = self
            .list_filters(&Scope::zone(zone.as_str()))
            .await?
            .into_result_or_default()?;

        info!(zone_id = %zone, count = filters.len(), "removing all filters");
        let mut results = Vec::with_capacity(filters.len());
        for filter in &filters {
            let Some(id) = filter.id.as_deref() else {
                warn!(zone_id = %zone, pattern = %filter.pattern, "skipping filter without id");
                continue;
            };
            results.push(self.remove_filter(&Scope::zone(zone.as_str()), id).await?);
        }
        Ok(results)
    }

    /// First filter whose pattern equals `pattern`; a failed listing is
    /// [`Error::Rejected`]
    pub async fn find_filter(&self, scope: &Scope, pattern: &str) -> Result<Filter> {
        let pattern = require(pattern, "a filter pattern")?;
        let filters = self.list_filters(scope).await?.into_result_or_default()?;
        find_first(filters, |filter| filter.pattern == pattern)
            .ok_or_else(|| Error::NotFound(format!("Filter '{}'", pattern)))
    }
}
