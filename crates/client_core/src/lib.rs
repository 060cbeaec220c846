//! Async REST client for the document/chat backend consumed by the DocChat
//! desktop app: document upload, chat turns, status polls, and document
//! clearing, plus the staging validation rules shared with the UI.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::domain::StagedFile;
use shared::error::ApiErrorBody;
use shared::protocol::{
    ChatRequest, ChatResponse, ClearDocumentsResponse, SystemStatus, UploadResponse,
};
use tracing::debug;

pub mod error;
pub mod staging;

pub use error::ApiFailure;
pub use reqwest::StatusCode;

/// Thin client over the backend's four endpoints. Cheap to clone; the
/// underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct DocChatClient {
    http: Client,
    base_url: String,
}

impl DocChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Upload every staged file in one multipart request (repeated `files`
    /// parts). File contents are read here so the UI thread never blocks
    /// on disk.
    pub async fn upload_documents(
        &self,
        files: &[StagedFile],
    ) -> Result<UploadResponse, ApiFailure> {
        let mut form = Form::new();
        for file in files {
            let bytes =
                tokio::fs::read(&file.path)
                    .await
                    .map_err(|source| ApiFailure::StagedFileRead {
                        path: file.path.clone(),
                        source,
                    })?;
            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)?;
            form = form.part("files", part);
        }

        debug!(file_count = files.len(), "uploading staged documents");
        let response = self
            .http
            .post(self.endpoint("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        decode_or_backend_error(response).await
    }

    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiFailure> {
        debug!(session_id = %request.session_id, "sending chat turn");
        let response = self
            .http
            .post(self.endpoint("/api/chat"))
            .json(request)
            .send()
            .await?;
        decode_or_backend_error(response).await
    }

    pub async fn fetch_status(&self) -> Result<SystemStatus, ApiFailure> {
        let response = self.http.get(self.endpoint("/api/status")).send().await?;
        decode_or_backend_error(response).await
    }

    pub async fn clear_documents(&self) -> Result<ClearDocumentsResponse, ApiFailure> {
        debug!("clearing indexed documents");
        let response = self
            .http
            .delete(self.endpoint("/api/documents"))
            .send()
            .await?;
        decode_or_backend_error(response).await
    }
}

/// Decode a 2xx body as `T`; otherwise pull the backend's `{"detail": ...}`
/// envelope out of the error body when it parses.
async fn decode_or_backend_error<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.bytes().await?;
    let detail = serde_json::from_slice::<ApiErrorBody>(&body)
        .ok()
        .map(|envelope| envelope.detail);
    Err(ApiFailure::Backend { status, detail })
}
