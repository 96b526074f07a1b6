use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::network::catalog_client::{send_json, CatalogClient};
use crate::network::collaborators::ImageAcquirer;
use crate::pipeline::types::{
    AcquiredImage, ImageFile, ImageReference, ImageSource, DEFAULT_MIME, DEFAULT_UPLOAD_NAME,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchImageResponse {
    #[serde(default)]
    data_url: Option<String>,
}

/// Reads a local image into a `data:` reference, keeping the original bytes
/// for upload.
pub async fn read_local_image(path: &Path) -> Result<AcquiredImage, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Acquisition(format!("{}: {}", path.display(), e)))?;
    if bytes.is_empty() {
        return Err(AppError::Acquisition(format!("{} is empty", path.display())));
    }

    let mime = image::guess_format(&bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(DEFAULT_MIME)
        .to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());

    debug!("Read {} ({} bytes, {})", file_name, bytes.len(), mime);
    Ok(AcquiredImage::new(
        ImageReference::from_bytes(&mime, &bytes),
        Some(ImageFile {
            file_name,
            mime,
            bytes,
        }),
    ))
}

impl CatalogClient {
    /// Asks the backend for a transportable copy of a remote image. Any failure
    /// falls back to referencing the original URL.
    pub async fn fetch_remote_image(&self, url: &str) -> Result<AcquiredImage, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::Acquisition("Image URL is empty".to_string()));
        }

        let request = self
            .http()
            .post(self.endpoint("/api/fetch-image"))
            .json(&serde_json::json!({ "url": url }));

        let fetched: Result<FetchImageResponse, AppError> =
            send_json(request, "Failed to fetch image", AppError::Acquisition).await;

        match fetched {
            Ok(FetchImageResponse {
                data_url: Some(data_url),
            }) if !data_url.is_empty() => {
                Ok(AcquiredImage::new(ImageReference::from_url(data_url), None))
            }
            Ok(_) => {
                warn!("Backend did not convert {}, using the original URL", url);
                Ok(AcquiredImage::new(ImageReference::from_url(url), None))
            }
            Err(e) => {
                warn!("{}, using the original URL {}", e, url);
                Ok(AcquiredImage::new(ImageReference::from_url(url), None))
            }
        }
    }
}

#[async_trait]
impl ImageAcquirer for CatalogClient {
    async fn acquire(&self, source: &ImageSource) -> Result<AcquiredImage, AppError> {
        match source {
            ImageSource::LocalFile(path) => read_local_image(path).await,
            ImageSource::RemoteUrl(url) => self.fetch_remote_image(url).await,
        }
    }
}
