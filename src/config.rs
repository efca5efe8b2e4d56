//! Configuration for the invoice pipeline.
//!
//! All pipeline behaviour is controlled through [`StudioConfig`], built via
//! its [`StudioConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a configuration across actions and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.
//!
//! # Timeouts
//! Deliberately absent: uploads and store calls run on clients without a
//! request timeout, so a hung service parks the in-flight action rather
//! than failing it. Hosts that need a bound should wrap the action future
//! themselves.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::InvoiceError;
use crate::identity::IdentityProvider;
use crate::pipeline::export::PageSetup;
use crate::pipeline::store::InvoiceStore;
use crate::pipeline::upload::{ObjectStorage, LOGO_PRESET, THUMBNAIL_PRESET};
use crate::progress::PipelineProgress;

/// Configuration for captures, exports and persistence.
///
/// Built via [`StudioConfig::builder()`] or [`StudioConfig::default()`].
///
/// # Example
/// ```rust
/// use invoicegen::StudioConfig;
///
/// let config = StudioConfig::builder()
///     .cloud_name("demo")
///     .store_base_url("http://localhost:8080/api")
///     .capture_scale(2.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct StudioConfig {
    /// Oversampling factor for captures, relative to on-screen size.
    /// Range: 1.0–4.0. Default: 2.0.
    ///
    /// 2× is the sweet spot: text stays crisp in the exported PDF and the
    /// thumbnail, while bitmaps stay small enough to upload comfortably.
    pub capture_scale: f32,

    /// Page geometry for exported PDFs. Default: A4, zero margin.
    pub page: PageSetup,

    /// Directory PDF downloads are written into. Default: `.`.
    pub output_dir: PathBuf,

    /// Currency prefix on rendered amounts. Default: `$`.
    pub currency: String,

    /// Object-storage cloud/tenant name. Required to build the default
    /// storage client unless a pre-built [`ObjectStorage`] is injected.
    pub cloud_name: Option<String>,

    /// Object-storage API endpoint. Default: the public Cloudinary API.
    pub storage_endpoint: String,

    /// Upload preset for thumbnails. Default: `invoices-thumbnail`.
    pub thumbnail_preset: String,

    /// Upload preset for logos. Default: `company-logos`.
    pub logo_preset: String,

    /// Invoice-store base URL, e.g. `http://localhost:8080/api`. Required
    /// for save/delete/list unless a pre-built [`InvoiceStore`] is
    /// injected.
    pub store_base_url: Option<String>,

    /// Explicit path to a `.ttf` for rasterisation. When unset, the
    /// system font directories are searched.
    pub font_path: Option<PathBuf>,

    /// Pre-built object storage. Takes precedence over `cloud_name`.
    pub storage: Option<Arc<dyn ObjectStorage>>,

    /// Pre-built invoice store. Takes precedence over `store_base_url`.
    pub store: Option<Arc<dyn InvoiceStore>>,

    /// Identity provider consulted before saves. Default: host-managed
    /// (always signed in).
    pub identity: Option<Arc<dyn IdentityProvider>>,

    /// Step-level progress events for the in-flight action.
    pub progress: Option<PipelineProgress>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            capture_scale: 2.0,
            page: PageSetup::default(),
            output_dir: PathBuf::from("."),
            currency: "$".to_string(),
            cloud_name: None,
            storage_endpoint: crate::pipeline::upload::CloudinaryStorage::DEFAULT_ENDPOINT
                .to_string(),
            thumbnail_preset: THUMBNAIL_PRESET.to_string(),
            logo_preset: LOGO_PRESET.to_string(),
            store_base_url: None,
            font_path: None,
            storage: None,
            store: None,
            identity: None,
            progress: None,
        }
    }
}

impl std::fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioConfig")
            .field("capture_scale", &self.capture_scale)
            .field("page", &self.page)
            .field("output_dir", &self.output_dir)
            .field("currency", &self.currency)
            .field("cloud_name", &self.cloud_name)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("thumbnail_preset", &self.thumbnail_preset)
            .field("logo_preset", &self.logo_preset)
            .field("store_base_url", &self.store_base_url)
            .field("font_path", &self.font_path)
            .field("storage", &self.storage.as_ref().map(|_| "<dyn ObjectStorage>"))
            .field("store", &self.store.as_ref().map(|_| "<dyn InvoiceStore>"))
            .field("identity", &self.identity.as_ref().map(|_| "<dyn IdentityProvider>"))
            .finish()
    }
}

impl StudioConfig {
    /// Create a new builder.
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`StudioConfig`].
#[derive(Debug)]
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    pub fn capture_scale(mut self, scale: f32) -> Self {
        self.config.capture_scale = scale.clamp(1.0, 4.0);
        self
    }

    pub fn page(mut self, page: PageSetup) -> Self {
        self.config.page = page;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn currency(mut self, symbol: impl Into<String>) -> Self {
        self.config.currency = symbol.into();
        self
    }

    pub fn cloud_name(mut self, name: impl Into<String>) -> Self {
        self.config.cloud_name = Some(name.into());
        self
    }

    pub fn storage_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.storage_endpoint = endpoint.into();
        self
    }

    pub fn thumbnail_preset(mut self, preset: impl Into<String>) -> Self {
        self.config.thumbnail_preset = preset.into();
        self
    }

    pub fn logo_preset(mut self, preset: impl Into<String>) -> Self {
        self.config.logo_preset = preset.into();
        self
    }

    pub fn store_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.store_base_url = Some(url.into());
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.config.storage = Some(storage);
        self
    }

    pub fn store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.config.store = Some(store);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.config.identity = Some(identity);
        self
    }

    pub fn progress_callback(mut self, progress: PipelineProgress) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StudioConfig, InvoiceError> {
        let c = &self.config;
        if !(1.0..=4.0).contains(&c.capture_scale) {
            return Err(InvoiceError::InvalidConfig(format!(
                "capture scale must be 1.0–4.0, got {}",
                c.capture_scale
            )));
        }
        if c.page.printable_width_mm() <= 0.0 || c.page.printable_height_mm() <= 0.0 {
            return Err(InvoiceError::InvalidConfig(
                "page margins leave no printable area".into(),
            ));
        }
        if c.thumbnail_preset.is_empty() || c.logo_preset.is_empty() {
            return Err(InvoiceError::InvalidConfig(
                "upload presets must be non-empty".into(),
            ));
        }
        Ok(self.config)
    }
}
