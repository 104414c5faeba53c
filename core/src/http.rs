//! HTTP transport types and the executor seam.
//!
//! # Design
//! Requests and responses are plain data. `ShopClient` builds `HttpRequest`
//! values without touching the network; an `HttpExecutor` performs the actual
//! round trip. Production code uses `ReqwestExecutor`, tests plug in scripted
//! executors.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::types::ShopForm;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// Request payload. JSON bodies are already serialized and carry their own
/// content-type header; multipart bodies are handed to the executor as-is so
/// it can choose the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    Json(String),
    Multipart(ShopForm),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network failure reported by an executor: no usable response was received.
#[derive(Debug, Clone)]
pub struct NetworkError(pub String);

/// Performs a single HTTP round trip.
///
/// Implementations return every received response as data, whatever its
/// status; status interpretation belongs to the caller.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError>;
}

/// `HttpExecutor` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestExecutor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn with_client(client: reqwest::Client, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }

    fn multipart(form: ShopForm) -> Result<reqwest::multipart::Form, NetworkError> {
        let mut multipart = reqwest::multipart::Form::new();
        for (name, value) in form.text_fields() {
            multipart = multipart.text(name, value);
        }
        if let Some(image) = form.image {
            let part = reqwest::multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)
                .map_err(|e| NetworkError(format!("invalid image content type: {e}")))?;
            multipart = multipart.part("imageFile", part);
        }
        Ok(multipart)
    }
}

impl Default for ReqwestExecutor {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };
        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            Some(HttpBody::Json(body)) => builder.body(body),
            Some(HttpBody::Multipart(form)) => builder.multipart(Self::multipart(form)?),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| NetworkError(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError(e.to_string()))?;
        debug!(status, "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
