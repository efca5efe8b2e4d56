//! Logo resolution: normalise the invoice's logo reference to a decoded
//! bitmap before layout.
//!
//! ## Why resolve ahead of capture?
//!
//! The logo on an invoice is usually a URL into object storage — content
//! the capture canvas cannot reach by itself. Fetching the bytes up front
//! (and failing loudly if the fetch or decode fails) means the capture
//! stage is a pure function over local data: either the full invoice, logo
//! included, is rasterised, or nothing is. A half-drawn capture never
//! reaches the export or upload stages.

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::InvoiceError;

/// Where a logo comes from.
pub enum LogoSource<'a> {
    /// `https://…` or `http://…` — fetched over HTTP.
    Url(&'a str),
    /// Anything else non-empty is treated as a local file path.
    Path(&'a str),
    /// The invoice has no logo; layout simply leaves the slot out.
    None,
}

impl<'a> LogoSource<'a> {
    /// Classify the raw `logo` field of an invoice.
    pub fn from_field(raw: &'a str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            LogoSource::None
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            LogoSource::Url(raw)
        } else {
            LogoSource::Path(raw)
        }
    }
}

/// Resolve the invoice's logo field to a decoded bitmap.
///
/// Returns `Ok(None)` when there is no logo. A fetch or decode failure is
/// a capture-stage error: the caller must not proceed to rasterisation.
pub async fn resolve_logo(raw: &str) -> Result<Option<DynamicImage>, InvoiceError> {
    match LogoSource::from_field(raw) {
        LogoSource::None => Ok(None),
        LogoSource::Url(url) => {
            info!(url, "fetching logo");
            let response = reqwest::get(url).await.map_err(|e| InvoiceError::LogoFetch {
                src: url.to_string(),
                reason: e.to_string(),
            })?;
            if !response.status().is_success() {
                return Err(InvoiceError::LogoFetch {
                    src: url.to_string(),
                    reason: format!("HTTP {}", response.status()),
                });
            }
            let bytes = response.bytes().await.map_err(|e| InvoiceError::LogoFetch {
                src: url.to_string(),
                reason: e.to_string(),
            })?;
            decode(&bytes).map(Some)
        }
        LogoSource::Path(path) => {
            debug!(path, "reading logo from disk");
            let bytes = tokio::fs::read(path).await.map_err(|e| InvoiceError::LogoFetch {
                src: path.to_string(),
                reason: e.to_string(),
            })?;
            decode(&bytes).map(Some)
        }
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, InvoiceError> {
    image::load_from_memory(bytes).map_err(|e| InvoiceError::LogoDecode {
        detail: e.to_string(),
    })
}
