// HTTP transport for the Cloudflare v4 API

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use workers_kit_core::{ClientConfig, Error, Result};

pub use reqwest::Method;

const AUTH_EMAIL_HEADER: &str = "X-Auth-Email";
const AUTH_KEY_HEADER: &str = "X-Auth-Key";

/// One part of a `multipart/form-data` body
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: Vec<u8>,
    pub file_name: Option<String>,
    pub mime: Option<String>,
}

impl FormPart {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into().into_bytes(),
            file_name: None,
            mime: None,
        }
    }

    pub fn bytes(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
            file_name: None,
            mime: None,
        }
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Content as UTF-8, if it is text
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent verbatim; the caller has already serialized it
    Text(String),
    Multipart(Vec<FormPart>),
}

/// A single API call: method, path or absolute URL, optional content type and body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Attach a JSON body with the matching content type
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let text = serde_json::to_string(body).map_err(|e| {
            Error::InvalidArgument(format!("request body is not valid JSON: {}", e))
        })?;
        self.content_type = Some("application/json".to_string());
        self.body = Some(RequestBody::Text(text));
        Ok(self)
    }

    /// Attach a multipart body; the boundary content type is set by the transport
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.content_type = None;
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Sends an [`ApiRequest`] and returns the decoded JSON body.
///
/// Implementations must not branch on HTTP status: the envelope inside the
/// body is the only success signal.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<Value>;
}

/// Prefix relative paths with the base endpoint; `https://` URLs are used as-is
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}{}", base_url, url)
    }
}

/// reqwest-backed transport authenticating with email + global API key
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(email) = &config.auth_email {
            headers.insert(
                HeaderName::from_static("x-auth-email"),
                header_value(AUTH_EMAIL_HEADER, email)?,
            );
        }
        if let Some(key) = &config.auth_key {
            headers.insert(
                HeaderName::from_static("x-auth-key"),
                header_value(AUTH_KEY_HEADER, key)?,
            );
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        builder = match &config.proxy {
            Some(endpoint) => builder.proxy(
                reqwest::Proxy::all(endpoint)
                    .map_err(|e| Error::Config(format!("Invalid proxy '{}': {}", endpoint, e)))?,
            ),
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value> {
        let url = resolve_url(&self.base_url, &request.url);
        debug!(method = %request.method, %url, "calling Cloudflare API");

        let mut builder = self.client.request(request.method, &url);
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Multipart(parts)) => builder.multipart(build_form(parts)?),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, %url, "non-success status, decoding envelope anyway");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(serde_json::from_slice(&body)?)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        Error::InvalidArgument(format!(
            "{} contains characters not allowed in a header",
            name
        ))
    })
}

fn build_form(parts: Vec<FormPart>) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        let mut encoded = Part::bytes(part.content);
        if let Some(file_name) = part.file_name {
            encoded = encoded.file_name(file_name);
        }
        if let Some(mime) = &part.mime {
            encoded = encoded
                .mime_str(mime)
                .map_err(|e| Error::InvalidArgument(format!("mime type '{}': {}", mime, e)))?;
        }
        form = form.part(part.name, encoded);
    }
    Ok(form)
}
