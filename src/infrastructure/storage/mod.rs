//! Image Storage
//!
//! Uploaded images live on the local filesystem under
//! `{uploads.dir}/{kind}/{uuid}.{ext}` and are served back from
//! `{uploads.public_url}`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::UploadSettings;
use crate::domain::services::ImageStore;
use crate::domain::ImageKind;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Sniff the format from the file's magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Filesystem-backed [`ImageStore`].
pub struct LocalImageStorage {
    dir: PathBuf,
    public_url: String,
    max_size_bytes: usize,
}

impl LocalImageStorage {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            dir: PathBuf::from(&settings.dir),
            public_url: settings.public_url.trim_end_matches('/').to_string(),
            max_size_bytes: settings.max_size_bytes,
        }
    }

    /// Check size and format before anything touches the disk.
    pub fn check(&self, bytes: &[u8]) -> Result<ImageFormat, AppError> {
        if bytes.len() > self.max_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Image exceeds the maximum size of {} bytes",
                self.max_size_bytes
            )));
        }
        ImageFormat::detect(bytes).ok_or_else(|| {
            AppError::UnsupportedMediaType("Only JPEG, PNG, GIF and WEBP images are accepted".into())
        })
    }

    /// Map a public path back to a file inside the storage directory.
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix(&self.public_url)?.trim_start_matches('/');
        let relative = Path::new(relative);
        if relative.components().all(|c| matches!(c, Component::Normal(_))) {
            Some(self.dir.join(relative))
        } else {
            None
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStorage {
    async fn store(&self, kind: ImageKind, bytes: Vec<u8>) -> Result<String, AppError> {
        let format = self.check(&bytes)?;

        let dir = self.dir.join(kind.dir());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create {}: {}", dir.display(), e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), format.extension());
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", path.display(), e)))?;

        metrics::record_image(kind.dir(), "stored");
        tracing::debug!(path = %path.display(), size = bytes.len(), "Image stored");
        Ok(format!("{}/{}/{}", self.public_url, kind.dir(), file_name))
    }

    async fn remove(&self, public_path: &str) -> Result<(), AppError> {
        let path = self
            .resolve(public_path)
            .ok_or_else(|| AppError::BadRequest(format!("Not a stored image: {}", public_path)))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                let kind = path
                    .parent()
                    .and_then(Path::file_name)
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown");
                metrics::record_image(kind, "removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to remove {}: {}", path.display(), e))),
        }
    }
}
