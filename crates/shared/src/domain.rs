use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Logical conversation identifier grouping chat turns on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Fresh time-based identifier for a "new session" action.
    pub fn fresh() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        Self(format!("session_{millis}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

/// Generation settings sent with every chat request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const MIN_MAX_TOKENS: u32 = 1;

impl ChatSettings {
    /// Clamp into the ranges the backend accepts: temperature in [0, 2],
    /// max_tokens strictly positive.
    pub fn clamped(self) -> Self {
        Self {
            temperature: self.temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
            max_tokens: self.max_tokens.max(MIN_MAX_TOKENS),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// Stable identifier for a staged file. Removal is keyed by this id rather
/// than list position, so rows generated before an add/remove never refer
/// to the wrong entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StagedFileId(pub u64);

/// A file selected or dropped by the user but not yet uploaded.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub id: StagedFileId,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub path: PathBuf,
}
