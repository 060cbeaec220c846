use serde::{Deserialize, Serialize};

/// Error envelope the backend attaches to non-2xx responses
/// (FastAPI-style `{"detail": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
