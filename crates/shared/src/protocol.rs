//! Wire types for the document/chat REST backend. Field names follow the
//! backend's JSON contract exactly.

use serde::{Deserialize, Serialize};

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub documents_processed: i64,
    pub processing_time: f64,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
    pub processing_time: f64,
}

/// A retrieved excerpt plus document metadata justifying an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCitation {
    pub content: String,
    pub metadata: SourceMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default = "default_source_label")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
}

fn default_source_label() -> String {
    "Document".to_string()
}

/// Response of `GET /api/status`. Aggregate counters owned by the backend;
/// the client mirrors them and never computes them locally (except for an
/// optimistic query-counter bump reconciled by the next poll).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub documents_indexed: i64,
    pub queries_processed: i64,
    pub avg_query_time: f64,
    pub backend: String,
}

/// Response of `DELETE /api/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearDocumentsResponse {
    #[serde(default)]
    pub message: Option<String>,
}
