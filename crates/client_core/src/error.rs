//! Submission failures and the user-facing messages they map to.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("server returned {status}{}", detail_suffix(.detail.as_deref()))]
    Status { status: u16, detail: Option<String> },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request failed: {0}")]
    Request(String),
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|detail| format!(": {detail}")).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot render {form} response: {reason}")]
pub struct RenderError {
    pub form: &'static str,
    pub reason: String,
}

impl From<RenderError> for TransportError {
    fn from(value: RenderError) -> Self {
        TransportError::Malformed(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Application(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    CannotConnect,
    EndpointMissing,
    ServerError,
    Application,
    Generic,
}

impl SubmitError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SubmitError::Validation(_) => FailureKind::Validation,
            SubmitError::Application(_) => FailureKind::Application,
            SubmitError::Transport(err) => match err {
                TransportError::Connect { .. } | TransportError::Timeout { .. } => {
                    FailureKind::CannotConnect
                }
                TransportError::Status { status: 404, .. } => FailureKind::EndpointMissing,
                TransportError::Status { status, .. } if (500..600).contains(status) => {
                    FailureKind::ServerError
                }
                _ => FailureKind::Generic,
            },
        }
    }

    pub fn user_message(&self, messages: &FailureMessages) -> String {
        match (self.kind(), self) {
            (_, SubmitError::Validation(err)) => err.message.clone(),
            (_, SubmitError::Application(reason)) if !reason.trim().is_empty() => reason.clone(),
            (FailureKind::Application, _) => messages.application_fallback.clone(),
            (FailureKind::CannotConnect, _) => messages.cannot_connect.clone(),
            (FailureKind::EndpointMissing, _) => messages.endpoint_missing.clone(),
            (FailureKind::ServerError, _) => messages.server_error.clone(),
            (_, err) => format!("{}: {err}", messages.generic_prefix),
        }
    }
}

/// Per-form wording for each failure class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMessages {
    pub cannot_connect: String,
    pub endpoint_missing: String,
    pub server_error: String,
    pub generic_prefix: String,
    pub application_fallback: String,
}

impl Default for FailureMessages {
    fn default() -> Self {
        Self {
            cannot_connect:
                "Cannot connect to server. Please check that it is running and try again.".into(),
            endpoint_missing: "API endpoint not found. Please check the server routes.".into(),
            server_error: "Server error. Please try again later.".into(),
            generic_prefix: "An error occurred".into(),
            application_fallback: "Request failed. Please try again.".into(),
        }
    }
}
