//! Image uploads addressed by public URL.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use fleetdesk_core::config::StorageConfig;
use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::storage::StorageProvider;

use crate::providers::LocalStorageProvider;

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedMedia {
    pub path: String,
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// Validates, stores and addresses uploaded images.
#[derive(Debug, Clone)]
pub struct MediaStore {
    provider: Arc<dyn StorageProvider>,
    public_base_url: String,
    max_bytes: usize,
    allowed_types: Vec<String>,
}

impl MediaStore {
    /// Build the configured provider and wrap it.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            "local" => Arc::new(LocalStorageProvider::new(&config.local.root_path).await?),
            #[cfg(feature = "s3")]
            "s3" => Arc::new(crate::providers::s3::S3StorageProvider::new(&config.s3).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'"
                )));
            }
        };
        if !provider.health_check().await? {
            return Err(AppError::storage(format!(
                "Storage provider '{}' is not reachable",
                provider.provider_type()
            )));
        }
        info!(provider = provider.provider_type(), "Media storage ready");
        Ok(Self::new(provider, config))
    }

    /// Wrap an existing provider with the limits from `config`.
    pub fn new(provider: Arc<dyn StorageProvider>, config: &StorageConfig) -> Self {
        Self {
            provider,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_upload_bytes,
            allowed_types: config
                .allowed_content_types
                .iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
        }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &dyn StorageProvider {
        self.provider.as_ref()
    }

    /// Public URL of an object path.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    /// Store an image under `folder/YYYY/MM/<uuid>.<ext>`.
    pub async fn upload(
        &self,
        folder: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<UploadedMedia> {
        let content_type = normalize_content_type(content_type);
        if !self.allowed_types.iter().any(|t| *t == content_type) {
            return Err(AppError::invalid_field(
                "file",
                format!("Unsupported file type: {content_type}"),
            ));
        }
        if data.is_empty() {
            return Err(AppError::invalid_field("file", "File is empty"));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::invalid_field(
                "file",
                format!("File exceeds the {} byte limit", self.max_bytes),
            ));
        }

        let path = format!(
            "{}/{}/{}.{}",
            folder.trim_matches('/'),
            Utc::now().format("%Y/%m"),
            Uuid::now_v7(),
            extension_for(&content_type)
        );
        let size = data.len();
        self.provider.put(&path, data, &content_type).await?;

        info!(path = %path, size, content_type = %content_type, "Media uploaded");
        Ok(UploadedMedia {
            url: self.public_url(&path),
            path,
            content_type,
            size,
        })
    }

    /// Turn an image field into a stored URL.
    ///
    /// Inline `data:` URLs are decoded and uploaded, other values are kept
    /// as given and blank values become `None`.
    pub async fn resolve_image(&self, value: Option<String>, folder: &str) -> AppResult<Option<String>> {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        match decode_data_url(&value)? {
            Some((content_type, data)) => {
                let uploaded = self.upload(folder, data, &content_type).await?;
                Ok(Some(uploaded.url))
            }
            None => Ok(Some(value)),
        }
    }

    /// [`resolve_image`](Self::resolve_image) over a list, dropping blanks.
    pub async fn resolve_images(&self, values: Vec<String>, folder: &str) -> AppResult<Vec<String>> {
        let mut urls = Vec::with_capacity(values.len());
        for value in values {
            if let Some(url) = self.resolve_image(Some(value), folder).await? {
                urls.push(url);
            }
        }
        Ok(urls)
    }
}

/// Decode `data:<mime>;base64,<payload>`.
///
/// Returns `Ok(None)` when `value` is not a data URL.
pub fn decode_data_url(value: &str) -> AppResult<Option<(String, Bytes)>> {
    let Some(rest) = value.strip_prefix("data:") else {
        return Ok(None);
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::invalid_field("image", "Malformed data URL"))?;
    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::invalid_field("image", "Data URL must be base64 encoded"))?;
    let data = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::invalid_field("image", "Invalid base64 image data"))?;
    Ok(Some((normalize_content_type(content_type), Bytes::from(data))))
}

fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_core::error::ErrorKind;

    async fn store(dir: &tempfile::TempDir) -> MediaStore {
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        let config = StorageConfig {
            public_base_url: "https://cdn.example.com/media/".into(),
            max_upload_bytes: 16,
            ..StorageConfig::default()
        };
        MediaStore::new(Arc::new(provider), &config)
    }

    #[test]
    fn test_decode_data_url() {
        let (mime, data) = decode_data_url("data:image/png;base64,aGVsbG8=")
            .unwrap()
            .unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(&data[..], b"hello");

        assert!(decode_data_url("https://cdn.example.com/a.png").unwrap().is_none());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64,***").is_err());
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir).await;

        let uploaded = media
            .upload("/blog/", Bytes::from_static(b"jpegdata"), "image/JPEG")
            .await
            .unwrap();
        assert!(uploaded.path.starts_with("blog/"));
        assert!(uploaded.path.ends_with(".jpg"));
        assert_eq!(uploaded.url, format!("https://cdn.example.com/media/{}", uploaded.path));
        assert!(media.provider().exists(&uploaded.path).await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_limits() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir).await;

        let wrong_type = media
            .upload("blog", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(wrong_type.kind, ErrorKind::Validation);

        let too_big = media
            .upload("blog", Bytes::from(vec![0u8; 17]), "image/png")
            .await
            .unwrap_err();
        assert_eq!(too_big.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_resolve_image() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir).await;

        assert_eq!(media.resolve_image(Some("  ".into()), "blog").await.unwrap(), None);
        assert_eq!(
            media
                .resolve_image(Some("https://img.example.com/x.png".into()), "blog")
                .await
                .unwrap()
                .as_deref(),
            Some("https://img.example.com/x.png")
        );

        let url = media
            .resolve_image(Some("data:image/png;base64,aGVsbG8=".into()), "vehicles")
            .await
            .unwrap()
            .unwrap();
        assert!(url.starts_with("https://cdn.example.com/media/vehicles/"));
    }
}
