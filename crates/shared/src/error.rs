use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the server sends alongside a non-2xx status, when it sends one at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Extracts the `error` message from a raw response body, if it has one.
    pub fn parse_message(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .map(|body| body.error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation result is missing `{field}`")]
pub struct IncompleteResult {
    pub field: &'static str,
}

impl IncompleteResult {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}
