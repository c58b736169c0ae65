use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::Value;
use shared::{error::ApiFailure, protocol::ResponseEnvelope};
use tracing::{debug, warn};
use url::Url;

use crate::error::TransportError;

const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub accept_json: bool,
}

impl JsonRequest {
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            accept_json: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            accept_json: true,
        }
    }

    pub fn accept_json(mut self, accept_json: bool) -> Self {
        self.accept_json = accept_json;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-2xx becomes a status error; a 2xx body must be a JSON envelope.
    pub fn into_envelope(self) -> Result<ResponseEnvelope, TransportError> {
        if !self.is_success() {
            return Err(TransportError::Status {
                status: self.status,
                detail: ApiFailure::detail_from_body(&self.body),
            });
        }
        serde_json::from_str(&self.body).map_err(|err| TransportError::Malformed(err.to_string()))
    }
}

/// One HTTP exchange. The controller issues exactly one per submit.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: JsonRequest) -> Result<HttpReply, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(base_url).map_err(|err| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn endpoint_url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| TransportError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: err.to_string(),
            })
    }
}

fn classify_reqwest_error(url: &Url, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            reason: err.to_string(),
        }
    } else if err.is_decode() || err.is_body() {
        TransportError::Malformed(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: JsonRequest) -> Result<HttpReply, TransportError> {
        let url = self.endpoint_url(&request.path)?;
        let mut builder = match request.method {
            Method::Get => self.http.get(url.clone()),
            Method::Post => self
                .http
                .post(url.clone())
                .header(CONTENT_TYPE, JSON_MIME)
                .json(request.body.as_ref().unwrap_or(&Value::Null)),
        };
        if request.accept_json {
            builder = builder.header(ACCEPT, JSON_MIME);
        }

        let response = builder.send().await.map_err(|err| {
            let err = classify_reqwest_error(&url, err);
            warn!(url = %url, error = %err, "transport: request failed");
            err
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| classify_reqwest_error(&url, err))?;
        debug!(url = %url, status, bytes = body.len(), "transport: response received");

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
