use serde::{Deserialize, Serialize};

/// Body returned by every endpoint when `success` is false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiFailure {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiFailure {
    /// Extracts the server-supplied message from an arbitrary response body, if any.
    pub fn detail_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ApiFailure>(body)
            .ok()
            .and_then(|failure| failure.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
