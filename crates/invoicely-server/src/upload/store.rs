use super::{UploadError, UploadKind, UploadPolicy};
use crate::config::UploadConfig;
use axum::extract::multipart::{Field, Multipart};
use invoicely_common_log::spans::upload_span;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn, Instrument};

const DEFAULT_MIMETYPE: &str = "application/octet-stream";

/// Result of an accepted upload.
#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    pub message: String,
    pub filename: String,
    /// Public URL path of the stored file.
    pub path: String,
    pub size: u64,
    pub mimetype: String,
}

/// Writes accepted uploads below a root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: Arc<PathBuf>,
    public_path: Arc<str>,
    logo: UploadPolicy,
    attachment: UploadPolicy,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: Arc::new(config.dir.clone()),
            public_path: config.public_path.trim_end_matches('/').into(),
            logo: UploadPolicy::new(UploadKind::Logo, config.logo_max_bytes),
            attachment: UploadPolicy::new(UploadKind::Attachment, config.attachment_max_bytes),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self, kind: UploadKind) -> &UploadPolicy {
        match kind {
            UploadKind::Logo => &self.logo,
            UploadKind::Attachment => &self.attachment,
        }
    }

    /// Store the first part named after `kind`'s field.
    ///
    /// Name checks happen before anything is written. A part that fails
    /// mid-stream leaves no file behind.
    pub async fn accept(
        &self,
        kind: UploadKind,
        multipart: &mut Multipart,
    ) -> Result<StoredUpload, UploadError> {
        let policy = self.policy(kind);

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::from_multipart(e, policy.max_bytes))?
        {
            if field.name() != Some(kind.field_name()) {
                continue;
            }

            let original = match field.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => return Err(UploadError::MissingFile(kind.field_name())),
            };
            let ext = policy.validate_name(&original)?;
            let mimetype = field
                .content_type()
                .unwrap_or(DEFAULT_MIMETYPE)
                .to_string();

            let filename = policy.generate_filename(&ext);
            let span = upload_span(kind.as_str(), &original);
            span.record("stored", filename.as_str());

            return self
                .write(kind, policy, &mut field, filename, mimetype)
                .instrument(span)
                .await;
        }

        Err(UploadError::MissingFile(kind.field_name()))
    }

    async fn write(
        &self,
        kind: UploadKind,
        policy: &UploadPolicy,
        field: &mut Field<'_>,
        filename: String,
        mimetype: String,
    ) -> Result<StoredUpload, UploadError> {
        let dir = self.root.join(kind.subdir());
        tokio::fs::create_dir_all(&dir).await?;
        let target = dir.join(&filename);

        let size = match stream_to_file(field, &target, policy.max_bytes).await {
            Ok(size) => size,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                    warn!(path = %target.display(), error = %cleanup, "Failed to remove partial upload");
                }
                warn!(error = %err, "Upload rejected");
                return Err(err);
            }
        };

        info!(size, "Upload stored");

        let message = match kind {
            UploadKind::Logo => "Logo uploaded successfully",
            UploadKind::Attachment => "File uploaded successfully",
        };

        Ok(StoredUpload {
            message: message.to_string(),
            path: format!("{}/{}/{}", self.public_path, kind.subdir(), filename),
            filename,
            size,
            mimetype,
        })
    }
}

async fn stream_to_file(
    field: &mut Field<'_>,
    target: &Path,
    limit: u64,
) -> Result<u64, UploadError> {
    let mut file = tokio::fs::File::create(target).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| UploadError::from_multipart(e, limit))?
    {
        written += chunk.len() as u64;
        if written > limit {
            return Err(UploadError::TooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};
    use invoicely_test_utils::{multipart_body, multipart_content_type, temp_dir, PNG_BYTES};

    async fn multipart(body: Vec<u8>) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .header("content-type", multipart_content_type())
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn store(dir: &Path, logo_limit: u64) -> UploadStore {
        UploadStore::new(&UploadConfig {
            dir: dir.to_path_buf(),
            logo_max_bytes: logo_limit,
            ..Default::default()
        })
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_accepts_png_logo() {
        let tmp = temp_dir();
        let store = store(tmp.path(), 1024);

        let mut mp = multipart(multipart_body("logo", "photo.png", "image/png", PNG_BYTES)).await;
        let stored = store.accept(UploadKind::Logo, &mut mp).await.unwrap();

        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.size, PNG_BYTES.len() as u64);
        assert_eq!(stored.path, format!("/uploads/logos/{}", stored.filename));
        assert_eq!(
            std::fs::read(tmp.path().join("logos").join(&stored.filename)).unwrap(),
            PNG_BYTES
        );
    }

    #[tokio::test]
    async fn test_rejects_exe_before_writing() {
        let tmp = temp_dir();
        let store = store(tmp.path(), 1024);

        let mut mp = multipart(multipart_body("logo", "photo.exe", "application/octet-stream", b"MZ")).await;
        let err = store.accept(UploadKind::Logo, &mut mp).await.unwrap_err();

        assert!(matches!(err, UploadError::InvalidExtension { .. }));
        assert_eq!(files_in(&tmp.path().join("logos")), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_leaves_no_file() {
        let tmp = temp_dir();
        let store = store(tmp.path(), 8);

        let mut mp = multipart(multipart_body("logo", "big.png", "image/png", &[0u8; 64])).await;
        let err = store.accept(UploadKind::Logo, &mut mp).await.unwrap_err();

        assert!(matches!(err, UploadError::TooLarge { limit: 8 }));
        assert_eq!(files_in(&tmp.path().join("logos")), 0);
    }

    #[tokio::test]
    async fn test_wrong_field_is_missing_file() {
        let tmp = temp_dir();
        let store = store(tmp.path(), 1024);

        let mut mp = multipart(multipart_body("file", "photo.png", "image/png", PNG_BYTES)).await;
        let err = store.accept(UploadKind::Logo, &mut mp).await.unwrap_err();

        assert!(matches!(err, UploadError::MissingFile("logo")));
    }

    #[tokio::test]
    async fn test_attachment_goes_to_its_own_dir() {
        let tmp = temp_dir();
        let store = store(tmp.path(), 1024);

        let mut mp = multipart(multipart_body("file", "INV-0042.pdf", "application/pdf", b"%PDF-1.7")).await;
        let stored = store.accept(UploadKind::Attachment, &mut mp).await.unwrap();

        assert!(stored.filename.starts_with("file-"));
        assert!(tmp.path().join("attachments").join(&stored.filename).exists());
        assert_eq!(stored.message, "File uploaded successfully");
    }
}
