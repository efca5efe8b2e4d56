//! Object storage: the upload seam and its Cloudinary-shaped HTTP client.
//!
//! The pipeline only ever needs one operation — "here are bytes (or a data
//! URI, or a URL the service can fetch itself), give me back a durable
//! URL". [`ObjectStorage`] captures exactly that, so tests and embedders
//! can swap the network out by injecting a pre-built client. Preset
//! selection is the *caller's* responsibility: thumbnails and logos go to
//! different presets and the storage service never guesses.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;
use serde::Deserialize;
use std::io::Cursor;
use tracing::{debug, info};

use crate::error::InvoiceError;

/// Upload preset for captured invoice thumbnails.
pub const THUMBNAIL_PRESET: &str = "invoices-thumbnail";
/// Upload preset for company logos.
pub const LOGO_PRESET: &str = "company-logos";

/// What is being uploaded.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// An inline `data:image/png;base64,…` payload.
    DataUri(String),
    /// A URL the storage service fetches itself (re-uploading an already
    /// hosted asset).
    Url(String),
    /// Raw file bytes.
    Bytes { data: Vec<u8>, filename: String },
}

/// The external object-storage service.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `source` under `preset` and return the durable URL.
    async fn upload(&self, source: UploadSource, preset: &str) -> Result<String, InvoiceError>;
}

/// PNG-encode a captured bitmap as a `data:` URI ready for upload.
///
/// PNG rather than JPEG: the capture is mostly crisp text on white, where
/// lossy artefacts are visible and lossless compresses well anyway.
pub fn png_data_uri(bitmap: &RgbaImage) -> Result<String, InvoiceError> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(bitmap.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| InvoiceError::Internal(format!("PNG encode failed: {e}")))?;
    let b64 = STANDARD.encode(&buf);
    debug!(bytes = b64.len(), "encoded thumbnail data URI");
    Ok(format!("data:image/png;base64,{b64}"))
}

/// Cloudinary-style unsigned upload endpoint.
///
/// POSTs `file` + `upload_preset` as multipart form data to
/// `{endpoint}/{cloud_name}/image/upload` and reads `secure_url` from the
/// JSON response.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    endpoint: String,
    cloud_name: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryStorage {
    /// Default public API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.cloudinary.com/v1_1";

    pub fn new(cloud_name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            // No request timeout: an upload hang parks the in-flight
            // action, matching the documented design.
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            cloud_name: cloud_name.into(),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.endpoint.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, source: UploadSource, preset: &str) -> Result<String, InvoiceError> {
        let upload_err = |reason: String| InvoiceError::Upload {
            preset: preset.to_string(),
            reason,
        };

        let mut form = reqwest::multipart::Form::new()
            .text("upload_preset", preset.to_string())
            .text("cloud_name", self.cloud_name.clone());
        form = match source {
            UploadSource::DataUri(uri) => form.text("file", uri),
            UploadSource::Url(url) => form.text("file", url),
            UploadSource::Bytes { data, filename } => form.part(
                "file",
                reqwest::multipart::Part::bytes(data).file_name(filename),
            ),
        };

        info!(preset, url = %self.upload_url(), "uploading asset");
        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upload_err(format!("HTTP {status}")));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| upload_err(format!("malformed response: {e}")))?;
        debug!(preset, url = %body.secure_url, "upload complete");
        Ok(body.secure_url)
    }
}
