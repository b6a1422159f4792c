use super::UploadError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "pdf", "doc", "docx", "xls", "xlsx", "csv", "txt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Logo,
    Attachment,
}

impl UploadKind {
    /// Multipart field carrying the file.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Attachment => "file",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Logo => IMAGE_EXTENSIONS,
            Self::Attachment => ATTACHMENT_EXTENSIONS,
        }
    }

    /// Directory under the upload root.
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Logo => "logos",
            Self::Attachment => "attachments",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Attachment => "attachment",
        }
    }
}

/// Naming and size rules for one kind of upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub kind: UploadKind,
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn new(kind: UploadKind, max_bytes: u64) -> Self {
        Self { kind, max_bytes }
    }

    /// Lowercased extension of an acceptable filename.
    pub fn validate_name(&self, filename: &str) -> Result<String, UploadError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|e| self.kind.extensions().contains(&e.as_str()));

        ext.ok_or_else(|| UploadError::InvalidExtension {
            filename: filename.to_string(),
            allowed: self.kind.extensions().join(", "),
        })
    }

    /// `<field>-<unix-ms>-<random>.<ext>`
    pub fn generate_filename(&self, ext: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("{}-{}-{}.{}", self.kind.field_name(), millis, suffix, ext)
    }
}
