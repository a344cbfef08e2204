//! Name-to-id resolution.
//!
//! Namespaces can be referenced by canonical id (a v4 UUID) or by title.
//! Titles are resolved client-side: one listing call, then a linear scan for
//! the first exact, case-sensitive title match. Titles are not unique on the
//! server, so when several namespaces share one the first in listing order
//! wins.
//!
//! The listing is not paginated; accounts with more namespaces than the API
//! returns in one page cannot resolve titles beyond it.

use tracing::debug;
use workers_kit_core::{Error, Namespace, Result, Scope, is_canonical_id};

use crate::client::{Client, require};

/// First item matching `predicate`, in listing order
pub fn find_first<T, P>(items: Vec<T>, predicate: P) -> Option<T>
where
    P: Fn(&T) -> bool,
{
    items.into_iter().find(|item| predicate(item))
}

impl Client {
    /// Canonical id for `candidate` within `account_id`.
    ///
    /// UUID-shaped candidates are returned unchanged without any request.
    /// Anything else is looked up by title; no match (or an unsuccessful
    /// listing) is [`Error::NotFound`].
    pub async fn resolve_namespace_id(&self, account_id: &str, candidate: &str) -> Result<String> {
        let candidate = require(candidate, "a namespace")?;
        if is_canonical_id(candidate) {
            return Ok(candidate.to_string());
        }

        debug!(account_id, title = candidate, "resolving namespace by title");
        self.namespace_by_title(account_id, candidate)
            .await?
            .map(|namespace| namespace.id)
            .ok_or_else(|| Error::NotFound(format!("Namespace '{}'", candidate)))
    }

    /// First namespace titled exactly `title`, if any
    pub async fn namespace_by_title(
        &self,
        account_id: &str,
        title: &str,
    ) -> Result<Option<Namespace>> {
        let namespaces = self
            .list_namespaces(&Scope::account(account_id))
            .await?
            .ok()
            .unwrap_or_default();
        Ok(find_first(namespaces, |namespace| namespace.title == title))
    }
}
