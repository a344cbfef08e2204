use serde_json::json;
use tracing::info;
use workers_kit_core::{Envelope, Namespace, Result, Scope};

use crate::client::{Client, require};
use crate::envelope::{self, Outcome};
use crate::transport::ApiRequest;

pub(crate) fn namespaces_path(account_id: &str) -> String {
    format!("/accounts/{}/storage/kv/namespaces", account_id)
}

impl Client {
    /// All namespaces of the account
    pub async fn list_namespaces(&self, scope: &Scope) -> Result<Outcome<Vec<Namespace>>> {
        let account = self.account_id(scope)?;
        let response = self.send(ApiRequest::get(namespaces_path(&account))).await?;
        envelope::unwrap(response)
    }

    /// Create a namespace titled `title`.
    ///
    /// A title already in use comes back as an unsuccessful envelope; check it
    /// with [`envelope::is_duplicate_namespace_error`].
    pub async fn create_namespace(&self, scope: &Scope, title: &str) -> Result<Envelope> {
        let account = self.account_id(scope)?;
        let title = require(title, "a title")?;

        info!(account_id = %account, title, "creating namespace");
        let request = ApiRequest::post(namespaces_path(&account)).json(&json!({ "title": title }))?;
        Ok(envelope::raw(self.send(request).await?))
    }

    /// Rename a namespace given by id or title
    pub async fn rename_namespace(
        &self,
        scope: &Scope,
        namespace: &str,
        title: &str,
    ) -> Result<Envelope> {
        let account = self.account_id(scope)?;
        let title = require(title, "a title")?;
        let id = self.resolve_namespace_id(&account, namespace).await?;

        let request = ApiRequest::put(format!("{}/{}", namespaces_path(&account), id))
            .json(&json!({ "title": title }))?;
        Ok(envelope::raw(self.send(request).await?))
    }

    /// Delete a namespace given by id or title
    pub async fn remove_namespace(&self, scope: &Scope, namespace: &str) -> Result<Envelope> {
        let account = self.account_id(scope)?;
        let id = self.resolve_namespace_id(&account, namespace).await?;

        info!(account_id = %account, namespace_id = %id, "removing namespace");
        let response = self
            .send(ApiRequest::delete(format!("{}/{}", namespaces_path(&account), id)))
            .await?;
        Ok(envelope::raw(response))
    }
}
