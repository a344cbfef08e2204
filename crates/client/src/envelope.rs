//! Response envelope handling.
//!
//! Every Cloudflare response is `{success, result, errors, messages}`. This
//! module is the single place that decides whether a response succeeded and
//! what its payload is; resource operations call [`unwrap`] (reads and
//! listings) or [`raw`] (mutations) exactly once per response.

use serde::de::DeserializeOwned;
use serde_json::Value;
use workers_kit_core::{Envelope, Error, Result};

/// Error code the API uses when a namespace title is already taken
pub const DUPLICATE_NAMESPACE_CODE: i64 = 10014;

/// True iff `response` is an object whose `success` field is boolean `true`
pub fn is_success(response: &Value) -> bool {
    matches!(response.get("success"), Some(Value::Bool(true)))
}

/// `result` of a successful response, if present and non-null
pub fn get_result(response: &Value) -> Option<&Value> {
    if !is_success(response) {
        return None;
    }
    response.get("result").filter(|result| !result.is_null())
}

/// Normalized read: the unwrapped payload, or the envelope as the server sent it
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Unwrapped(T),
    Raw(Envelope),
}

impl<T> Outcome<T> {
    pub fn is_unwrapped(&self) -> bool {
        matches!(self, Outcome::Unwrapped(_))
    }

    /// Payload, dropping a raw envelope
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Unwrapped(value) => Some(value),
            Outcome::Raw(_) => None,
        }
    }

    /// Payload, or [`Error::Rejected`] carrying the envelope's errors
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Unwrapped(value) => Ok(value),
            Outcome::Raw(envelope) => Err(Error::Rejected {
                errors: envelope.errors,
            }),
        }
    }

    /// Like [`Outcome::into_result`], but a successful envelope without a
    /// `result` yields `T::default()` instead of an error
    pub fn into_result_or_default(self) -> Result<T>
    where
        T: Default,
    {
        match self {
            Outcome::Unwrapped(value) => Ok(value),
            Outcome::Raw(envelope) if envelope.success => Ok(T::default()),
            Outcome::Raw(envelope) => Err(Error::Rejected {
                errors: envelope.errors,
            }),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Unwrapped(value) => Outcome::Unwrapped(f(value)),
            Outcome::Raw(envelope) => Outcome::Raw(envelope),
        }
    }
}

/// Unwrap `result` into `T` when the response succeeded, else keep the envelope.
///
/// A successful response whose `result` has the wrong shape is a decode error,
/// not a raw envelope: the server said yes, so a mismatch is ours to report.
pub fn unwrap<T: DeserializeOwned>(response: Value) -> Result<Outcome<T>> {
    match get_result(&response) {
        Some(result) => Ok(Outcome::Unwrapped(serde_json::from_value(result.clone())?)),
        None => Ok(Outcome::Raw(raw(response))),
    }
}

/// The envelope as sent, for mutations
pub fn raw(response: Value) -> Envelope {
    Envelope::from_value(response)
}

/// True only for a failed envelope with exactly one error, coded 10014
pub fn is_duplicate_namespace_error(envelope: &Envelope) -> bool {
    !envelope.success
        && envelope.errors.len() == 1
        && envelope.errors[0].code == DUPLICATE_NAMESPACE_CODE
}
