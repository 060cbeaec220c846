//! Validation rules for files the user stages before an upload.

use std::fs;
use std::path::Path;

use shared::domain::{StagedFile, StagedFileId};
use thiserror::Error;

/// Size ceiling for a single staged file.
pub const MAX_STAGED_FILE_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "text/plain",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Why a candidate file was not staged. One rejection per candidate; other
/// candidates in the same batch are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("{mime_type} is not a supported file type")]
    UnsupportedType { mime_type: String },
    #[error("file exceeds the 10MB limit ({size_bytes} bytes)")]
    TooLarge { size_bytes: u64 },
}

pub fn validate_candidate(mime_type: &str, size_bytes: u64) -> Result<(), RejectReason> {
    if !is_allowed_mime_type(mime_type) {
        return Err(RejectReason::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }
    if size_bytes > MAX_STAGED_FILE_BYTES {
        return Err(RejectReason::TooLarge { size_bytes });
    }
    Ok(())
}

/// MIME type for a candidate path. Drag payloads carry no type on every
/// platform, so this is inferred from the extension.
pub fn mime_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error("could not inspect {name}: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build a [`StagedFile`] from a picked or dropped path, applying the
/// MIME allow-list and size ceiling.
pub fn stage_candidate(id: StagedFileId, path: &Path) -> Result<StagedFile, StageError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let metadata = fs::metadata(path).map_err(|source| StageError::Unreadable {
        name: name.clone(),
        source,
    })?;
    let size_bytes = metadata.len();
    let mime_type = mime_for_path(path);
    validate_candidate(&mime_type, size_bytes)?;
    Ok(StagedFile {
        id,
        name,
        size_bytes,
        mime_type,
        path: path.to_path_buf(),
    })
}
