use shared::error::IncompleteResult;
use thiserror::Error;

use crate::flow::FlowKind;

/// Failure of one remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server's `error` field, or the flow fallback.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{file_name} is not an image ({mime_type})")]
    NotAnImage {
        file_name: String,
        mime_type: String,
    },
    #[error("preview decode was interrupted: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("object url {0} is not registered")]
    UnknownUrl(String),
    #[error("failed to save {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a flow can end with besides success. Each variant is shown to the user
/// exactly once, at the flow boundary.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Please select an image first.")]
    MissingImage,
    #[error("There is nothing to share yet.")]
    NothingToShare,
    #[error("{flow} is already in progress")]
    Busy { flow: FlowKind },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Incomplete(#[from] IncompleteResult),
    #[error(transparent)]
    Download(#[from] DownloadError),
}
