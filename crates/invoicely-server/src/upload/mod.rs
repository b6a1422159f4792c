//! File upload acceptance for logos and invoice attachments.

mod policy;
mod store;

pub use policy::{UploadKind, UploadPolicy};
pub use store::{StoredUpload, UploadStore};

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded in field '{0}'")]
    MissingFile(&'static str),

    #[error("File type not allowed: {filename} (allowed: {allowed})")]
    InvalidExtension { filename: String, allowed: String },

    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Malformed multipart body: {0}")]
    Multipart(#[source] MultipartError),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Body-limit rejections surface as multipart errors; report them as size errors.
    pub(crate) fn from_multipart(err: MultipartError, limit: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge { limit }
        } else {
            Self::Multipart(err)
        }
    }
}
