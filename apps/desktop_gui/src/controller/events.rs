//! Events flowing from the backend worker to the UI, and how API failures
//! are worded for the user.

use client_core::ApiFailure;
use shared::protocol::{ChatResponse, ClearDocumentsResponse, SystemStatus, UploadResponse};

pub enum UiEvent {
    WorkerReady,
    WorkerStartupFailed(String),
    UploadFinished(Result<UploadResponse, ApiFailure>),
    ChatFinished(Result<ChatResponse, ApiFailure>),
    StatusUpdated(SystemStatus),
    /// A status poll failed. The sidebar keeps its stale values; this only
    /// lets the startup splash resolve when the backend is unreachable.
    StatusUnavailable,
    DocumentsCleared(Result<ClearDocumentsResponse, ApiFailure>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureContext {
    Upload,
    Chat,
    ClearDocuments,
}

impl FailureContext {
    pub fn title(self) -> &'static str {
        match self {
            FailureContext::Upload => "Upload Failed",
            FailureContext::Chat => "Chat Error",
            FailureContext::ClearDocuments => "Clear Failed",
        }
    }

    /// Message used when the backend sent no usable `detail` text.
    pub fn fallback(self) -> &'static str {
        match self {
            FailureContext::Upload => "Upload failed",
            FailureContext::Chat => "Failed to get response",
            FailureContext::ClearDocuments => "Failed to clear documents",
        }
    }

    /// Some contexts reword raw transport errors into a friendlier line.
    pub fn transport_rewording(self) -> Option<&'static str> {
        match self {
            FailureContext::ClearDocuments => {
                Some("Network error - please check your connection and try again")
            }
            FailureContext::Upload | FailureContext::Chat => None,
        }
    }
}

/// Title and message for the error toast reporting `failure`.
pub fn failure_notice(context: FailureContext, failure: &ApiFailure) -> (&'static str, String) {
    let message = match context.transport_rewording() {
        Some(reworded) if failure.is_transport() => reworded.to_string(),
        _ => failure.detail_or(context.fallback()),
    };
    (context.title(), message)
}
