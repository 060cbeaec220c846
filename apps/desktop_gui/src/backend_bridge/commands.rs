//! Backend commands queued from UI to the backend worker.

use std::time::Duration;

use shared::domain::StagedFile;
use shared::protocol::ChatRequest;

pub enum BackendCommand {
    /// One multipart upload carrying every staged file.
    UploadDocuments { files: Vec<StagedFile> },
    SendChat { request: ChatRequest },
    /// Event-triggered status poll, optionally delayed so the backend has
    /// settled its counters first.
    FetchStatus { delay: Option<Duration> },
    ClearDocuments,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::UploadDocuments { .. } => "upload_documents",
            BackendCommand::SendChat { .. } => "send_chat",
            BackendCommand::FetchStatus { .. } => "fetch_status",
            BackendCommand::ClearDocuments => "clear_documents",
        }
    }
}
