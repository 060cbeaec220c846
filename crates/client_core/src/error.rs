use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a backend API call, split the way the UI reports it: backend
/// rejections carry the server's `detail` text, everything that never
/// produced a decodable response is transport-class.
#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("backend error ({status}): {}", detail.as_deref().unwrap_or("no detail provided"))]
    Backend {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not read staged file {}: {source}", path.display())]
    StagedFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ApiFailure {
    /// True for failures where no backend response was decoded at all
    /// (connect/timeout/body errors). These get reworded to a friendlier
    /// network message in some UI contexts.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiFailure::Transport(_))
    }

    /// The message a notification should carry: the backend's `detail` when
    /// present, the given fallback when the backend sent no usable body,
    /// and the underlying error text for local/transport failures.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ApiFailure::Backend {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiFailure::Backend { detail: None, .. } => fallback.to_string(),
            ApiFailure::Transport(err) => err.to_string(),
            ApiFailure::StagedFileRead { .. } => self.to_string(),
        }
    }
}
