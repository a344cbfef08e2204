use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::debug;
use workers_kit_core::{Envelope, Error, KeyInfo, KvEntry, Result, Scope};

use super::namespaces::namespaces_path;
use crate::client::{Client, require};
use crate::envelope::{self, Outcome};
use crate::transport::ApiRequest;

fn keys_path(account_id: &str, namespace_id: &str) -> String {
    format!("{}/{}/keys", namespaces_path(account_id), namespace_id)
}

/// Everything outside RFC 3986 unreserved characters is escaped
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Keys are sent as a single path segment
fn value_path(account_id: &str, namespace_id: &str, key: &str) -> String {
    format!(
        "{}/{}/values/{}",
        namespaces_path(account_id),
        namespace_id,
        utf8_percent_encode(key, KEY_SEGMENT)
    )
}

impl Client {
    /// Keys stored in a namespace given by id or title
    pub async fn list_keys(
        &self,
        scope: &Scope,
        namespace: &str,
    ) -> Result<Outcome<Vec<KeyInfo>>> {
        let account = self.account_id(scope)?;
        let namespace_id = self.resolve_namespace_id(&account, namespace).await?;
        self.keys_in(&account, &namespace_id).await
    }

    /// Value stored under `key`
    pub async fn get_value(
        &self,
        scope: &Scope,
        namespace: &str,
        key: &str,
    ) -> Result<Outcome<Value>> {
        let account = self.account_id(scope)?;
        let key = require(key, "a key")?;
        let namespace_id = self.resolve_namespace_id(&account, namespace).await?;
        self.value_in(&account, &namespace_id, key).await
    }

    /// Every key of the namespace with its value, in listing order.
    ///
    /// Values are fetched one at a time. The first listing or fetch that
    /// does not succeed aborts the whole call with [`Error::Rejected`]; a
    /// successful fetch without a `result` is stored as `null`.
    pub async fn all_keys_and_values(
        &self,
        scope: &Scope,
        namespace: &str,
    ) -> Result<Vec<KvEntry>> {
        let account = self.account_id(scope)?;
        let namespace_id = self.resolve_namespace_id(&account, namespace).await?;

        let keys = self
            .keys_in(&account, &namespace_id)
            .await?
            .into_result_or_default()?;
        debug!(namespace_id = %namespace_id, count = keys.len(), "fetching values");

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self
                .value_in(&account, &namespace_id, &key.name)
                .await?
                .into_result_or_default()?;
            entries.push(KvEntry {
                key: key.name,
                value,
            });
        }
        Ok(entries)
    }

    /// Store `value`, serialized as JSON, under `key`
    pub async fn set_value(
        &self,
        scope: &Scope,
        namespace: &str,
        key: &str,
        value: &Value,
    ) -> Result<Envelope> {
        let account = self.account_id(scope)?;
        let key = require(key, "a key")?;
        if value.is_null() {
            return Err(Error::MissingArgument("a value"));
        }
        let namespace_id = self.resolve_namespace_id(&account, namespace).await?;

        let request = ApiRequest::put(value_path(&account, &namespace_id, key)).json(value)?;
        Ok(envelope::raw(self.send(request).await?))
    }

    pub async fn delete_key(&self, scope: &Scope, namespace: &str, key: &str) -> Result<Envelope> {
        let account = self.account_id(scope)?;
        let key = require(key, "a key")?;
        let namespace_id = self.resolve_namespace_id(&account, namespace).await?;

        let response = self
            .send(ApiRequest::delete(value_path(&account, &namespace_id, key)))
            .await?;
        Ok(envelope::raw(response))
    }

    async fn keys_in(&self, account: &str, namespace_id: &str) -> Result<Outcome<Vec<KeyInfo>>> {
        let response = self.send(ApiRequest::get(keys_path(account, namespace_id))).await?;
        envelope::unwrap(response)
    }

    async fn value_in(
        &self,
        account: &str,
        namespace_id: &str,
        key: &str,
    ) -> Result<Outcome<Value>> {
        let response = self
            .send(ApiRequest::get(value_path(account, namespace_id, key)))
            .await?;
        envelope::unwrap(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, failed, ok, text_body};
    use crate::transport::Method;
    use serde_json::json;

    const NAMESPACES: &str = "/accounts/1/storage/kv/namespaces";
    const NS: &str = "/accounts/1/storage/kv/namespaces/12345";
    const NS_UUID: &str = "0f2ac74b-498b-4a7a-9d4d-b4a1c4d3c9e2";

    fn namespace_listing() -> RecordingTransport {
        RecordingTransport::new().respond(
            Method::GET,
            NAMESPACES,
            ok(json!([{"id": "12345", "title": "myNamespace"}])),
        )
    }

    #[tokio::test]
    async fn test_list_keys_by_title() {
        let (client, transport) = namespace_listing()
            .respond(
                Method::GET,
                &format!("{}/keys", NS),
                ok(json!([{"name": "abc"}, {"name": "ab", "expiration": 1577836800}])),
            )
            .into_client(Scope::default());

        let keys = client
            .list_keys(&Scope::account("1"), "myNamespace")
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].name, "abc");
        assert_eq!(keys[1].expiration, Some(1577836800));
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_list_keys_by_id_skips_lookup() {
        let path = format!("{}/{}/keys", NAMESPACES, NS_UUID);
        let (client, transport) = RecordingTransport::new()
            .respond(Method::GET, &path, ok(json!([{"name": "abc"}])))
            .into_client(Scope::account("1"));

        let outcome = client.list_keys(&Scope::default(), NS_UUID).await.unwrap();
        assert!(outcome.is_unwrapped());
        assert_eq!(transport.call_lines(), vec![format!("GET {}", path)]);
    }

    #[tokio::test]
    async fn test_get_value() {
        let (client, _transport) = namespace_listing()
            .respond(Method::GET, &format!("{}/values/abc", NS), ok(json!("1")))
            .into_client(Scope::default());

        let outcome = client
            .get_value(&Scope::account("1"), "myNamespace", "abc")
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Unwrapped(json!("1")));
    }

    #[tokio::test]
    async fn test_all_keys_and_values_preserves_order() {
        let (client, transport) = namespace_listing()
            .respond(
                Method::GET,
                &format!("{}/keys", NS),
                ok(json!([{"name": "abc"}, {"name": "ab"}])),
            )
            .respond(Method::GET, &format!("{}/values/abc", NS), ok(json!("1")))
            .respond(Method::GET, &format!("{}/values/ab", NS), ok(json!("2")))
            .into_client(Scope::default());

        let entries = client
            .all_keys_and_values(&Scope::account("1"), "myNamespace")
            .await
            .unwrap();
        assert_eq!(
            entries,
            vec![
                KvEntry {
                    key: "abc".to_string(),
                    value: json!("1")
                },
                KvEntry {
                    key: "ab".to_string(),
                    value: json!("2")
                },
            ]
        );
        // the namespace title is resolved once
        assert_eq!(
            transport.call_lines(),
            vec![
                format!("GET {}", NAMESPACES),
                format!("GET {}/keys", NS),
                format!("GET {}/values/abc", NS),
                format!("GET {}/values/ab", NS),
            ]
        );
    }

    #[tokio::test]
    async fn test_all_keys_and_values_aborts_on_failed_fetch() {
        let (client, transport) = namespace_listing()
            .respond(
                Method::GET,
                &format!("{}/keys", NS),
                ok(json!([{"name": "abc"}, {"name": "ab"}, {"name": "z"}])),
            )
            .respond(Method::GET, &format!("{}/values/abc", NS), ok(json!("1")))
            .respond(
                Method::GET,
                &format!("{}/values/ab", NS),
                failed(10009, "key not found"),
            )
            .into_client(Scope::default());

        let result = client
            .all_keys_and_values(&Scope::account("1"), "myNamespace")
            .await;
        match result {
            Err(Error::Rejected { errors }) => assert_eq!(errors[0].code, 10009),
            other => panic!("unexpected {:?}", other),
        }
        // nothing fetched after the failure
        assert_eq!(transport.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_all_keys_and_values_keeps_empty_value() {
        let (client, _transport) = namespace_listing()
            .respond(
                Method::GET,
                &format!("{}/keys", NS),
                ok(json!([{"name": "abc"}, {"name": "ab"}])),
            )
            .respond(Method::GET, &format!("{}/values/abc", NS), ok(json!(null)))
            .respond(Method::GET, &format!("{}/values/ab", NS), ok(json!("2")))
            .into_client(Scope::default());

        let entries = client
            .all_keys_and_values(&Scope::account("1"), "myNamespace")
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "abc");
        assert_eq!(entries[0].value, Value::Null);
        assert_eq!(entries[1].value, json!("2"));
    }

    #[test]
    fn test_value_path_escapes_key() {
        assert_eq!(
            value_path("1", "ns", "a?b#c/d"),
            "/accounts/1/storage/kv/namespaces/ns/values/a%3Fb%23c%2Fd"
        );
        assert_eq!(
            value_path("1", "ns", "my key"),
            "/accounts/1/storage/kv/namespaces/ns/values/my%20key"
        );
        assert_eq!(
            value_path("1", "ns", "v1.2_x-y~z"),
            "/accounts/1/storage/kv/namespaces/ns/values/v1.2_x-y~z"
        );
    }

    #[tokio::test]
    async fn test_key_with_reserved_characters_stays_one_segment() {
        let base = format!("{}/{}/values", NAMESPACES, NS_UUID);
        let (client, transport) = RecordingTransport::new()
            .respond(Method::GET, &format!("{}/a%3Fb", base), ok(json!("q")))
            .into_client(Scope::account("1"));
        let scope = Scope::default();

        let outcome = client.get_value(&scope, NS_UUID, "a?b").await.unwrap();
        assert_eq!(outcome, Outcome::Unwrapped(json!("q")));
        client
            .set_value(&scope, NS_UUID, "dir/file", &json!(1))
            .await
            .unwrap();
        client.delete_key(&scope, NS_UUID, "my key").await.unwrap();

        assert_eq!(
            transport.call_lines(),
            vec![
                format!("GET {}/a%3Fb", base),
                format!("PUT {}/dir%2Ffile", base),
                format!("DELETE {}/my%20key", base),
            ]
        );
    }

    #[tokio::test]
    async fn test_set_value_serializes_json() {
        let (client, transport) = namespace_listing()
            .respond(
                Method::PUT,
                &format!("{}/values/abc", NS),
                ok(json!({"name": "abc", "value": "value"})),
            )
            .into_client(Scope::default());

        let envelope = client
            .set_value(&Scope::account("1"), "myNamespace", "abc", &json!("value"))
            .await
            .unwrap();
        assert_eq!(envelope.result, Some(json!({"name": "abc", "value": "value"})));

        let call = transport.last_call();
        assert_eq!(call.content_type.as_deref(), Some("application/json"));
        assert_eq!(text_body(&call), r#""value""#);
    }

    #[tokio::test]
    async fn test_set_value_validates_before_network() {
        let (client, transport) = namespace_listing().into_client(Scope::default());
        let scope = Scope::account("1");

        let missing_key = client.set_value(&scope, "myNamespace", "", &json!(1)).await;
        assert_eq!(
            missing_key.unwrap_err().to_string(),
            "You must provide a key"
        );

        let missing_value = client
            .set_value(&scope, "myNamespace", "abc", &Value::Null)
            .await;
        assert_eq!(
            missing_value.unwrap_err().to_string(),
            "You must provide a value"
        );

        let missing_account = client
            .set_value(&Scope::default(), "myNamespace", "abc", &json!(1))
            .await;
        assert!(matches!(missing_account, Err(Error::MissingScope(_))));

        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_key_returns_raw_envelope() {
        let (client, transport) = RecordingTransport::new()
            .respond(
                Method::DELETE,
                &format!("{}/{}/values/abc", NAMESPACES, NS_UUID),
                ok(json!("deleted")),
            )
            .into_client(Scope::default());

        let envelope = client
            .delete_key(&Scope::account("1"), NS_UUID, "abc")
            .await
            .unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.result, Some(json!("deleted")));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_get_value_unknown_namespace() {
        let (client, transport) = namespace_listing().into_client(Scope::default());
        let result = client
            .get_value(&Scope::account("1"), "missing", "abc")
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(transport.calls().len(), 1);
    }
}
