//! Action entry points: save, download, delete, logo upload, listing.
//!
//! ## Why an explicit ordered pipeline?
//!
//! A save is a chain of fallible steps — capture, thumbnail upload, logo
//! upload, payload assembly, store save — and the order carries the
//! guarantees: both uploads must yield durable URLs before the payload is
//! assembled, and the store is only contacted after that. Each step's
//! failure short-circuits the remainder and returns an error variant that
//! identifies the step, so a caller always knows how far the save got and
//! that nothing after the failing step ran.
//!
//! Rasterisation is CPU-bound and runs under `spawn_blocking`; everything
//! else awaits network I/O. Local invoice state is never mutated here —
//! the session adopts URLs only after a fully successful save.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, info};

use crate::config::StudioConfig;
use crate::error::InvoiceError;
use crate::font::Typeface;
use crate::identity::{HostManagedIdentity, IdentityProvider};
use crate::layout::{self, LayoutOptions};
use crate::model::Invoice;
use crate::pipeline::capture::{self, CaptureOptions};
use crate::pipeline::export;
use crate::pipeline::logo::{self, LogoSource};
use crate::pipeline::store::{InvoiceStore, RestInvoiceStore};
use crate::pipeline::upload::{self, CloudinaryStorage, ObjectStorage, UploadSource};
use crate::progress::PipelineStep;
use crate::template::{self, Template};

/// Result of a successful save: the durable URLs and the record exactly as
/// it was sent to the store.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub thumbnail_url: String,
    /// Durable logo URL; empty when the invoice has no logo.
    pub logo_url: String,
    pub record: Invoice,
}

// ── Service resolution ───────────────────────────────────────────────────

/// Resolve object storage: a pre-built instance wins, otherwise the
/// Cloudinary client is constructed from `cloud_name`.
fn resolve_storage(config: &StudioConfig) -> Result<Arc<dyn ObjectStorage>, InvoiceError> {
    if let Some(ref storage) = config.storage {
        return Ok(Arc::clone(storage));
    }
    let cloud = config.cloud_name.as_deref().ok_or_else(|| {
        InvoiceError::InvalidConfig(
            "no object storage configured: set cloud_name or inject a storage client".into(),
        )
    })?;
    Ok(Arc::new(CloudinaryStorage::new(
        cloud,
        config.storage_endpoint.clone(),
    )))
}

/// Resolve the invoice-store: a pre-built instance wins, otherwise the
/// REST client is constructed from `store_base_url`.
fn resolve_store(config: &StudioConfig) -> Result<Arc<dyn InvoiceStore>, InvoiceError> {
    if let Some(ref store) = config.store {
        return Ok(Arc::clone(store));
    }
    let base = config.store_base_url.as_deref().ok_or_else(|| {
        InvoiceError::InvalidConfig(
            "no invoice-store configured: set store_base_url or inject a store client".into(),
        )
    })?;
    Ok(Arc::new(RestInvoiceStore::new(base)))
}

fn resolve_identity(config: &StudioConfig) -> Arc<dyn IdentityProvider> {
    config
        .identity
        .as_ref()
        .map(Arc::clone)
        .unwrap_or_else(|| Arc::new(HostManagedIdentity))
}

// ── Progress plumbing ────────────────────────────────────────────────────

fn step_start(config: &StudioConfig, step: PipelineStep) {
    if let Some(ref p) = config.progress {
        p.on_step_start(step);
    }
}

fn step_done(config: &StudioConfig, step: PipelineStep) {
    if let Some(ref p) = config.progress {
        p.on_step_complete(step);
    }
}

fn step_failed(config: &StudioConfig, step: PipelineStep, err: InvoiceError) -> InvoiceError {
    if let Some(ref p) = config.progress {
        p.on_step_error(step, &err.to_string());
    }
    err
}

async fn with_action<F, T>(config: &StudioConfig, action: &str, fut: F) -> Result<T, InvoiceError>
where
    F: std::future::Future<Output = Result<T, InvoiceError>>,
{
    if let Some(ref p) = config.progress {
        p.on_action_start(action);
    }
    let result = fut.await;
    if let Some(ref p) = config.progress {
        p.on_action_complete(action, result.is_ok());
    }
    result
}

// ── Capture ──────────────────────────────────────────────────────────────

/// Lay the invoice out against `template` and rasterise it at the
/// configured oversampling scale.
///
/// The logo is resolved to bytes first, so a broken logo reference fails
/// the capture before any pixel is drawn.
pub async fn capture_invoice(
    invoice: &Invoice,
    template: Template,
    config: &StudioConfig,
) -> Result<RgbaImage, InvoiceError> {
    // ── Resolve the logo asset ───────────────────────────────────────────
    let logo = logo::resolve_logo(&invoice.logo).await?;

    // ── Resolve a typeface ───────────────────────────────────────────────
    let typeface = Typeface::resolve(config.font_path.as_deref())?;
    debug!(source = typeface.source(), "typeface resolved");

    // ── Layout + rasterise (CPU-bound) ───────────────────────────────────
    let capture_opts = CaptureOptions {
        scale: config.capture_scale,
        scroll_y: 0.0,
    };
    let layout_opts = LayoutOptions {
        origin: (0.0, 0.0),
        currency: config.currency.clone(),
    };
    let invoice = invoice.clone();
    let bitmap = tokio::task::spawn_blocking(move || {
        let view = layout::layout_invoice(&invoice, template, Arc::new(typeface), logo, &layout_opts);
        capture::capture(&view, &capture_opts)
    })
    .await
    .map_err(|e| InvoiceError::Internal(format!("capture task panicked: {e}")))??;

    info!(
        width = bitmap.width(),
        height = bitmap.height(),
        template = template.id(),
        "invoice captured"
    );
    Ok(bitmap)
}

// ── Save ─────────────────────────────────────────────────────────────────

/// Run the full save pipeline: validate, capture, upload both assets,
/// assemble the payload and submit it to the invoice-store.
///
/// On success the returned [`SaveOutcome`] carries the durable URLs; on
/// any failure the local invoice is untouched and remains editable.
pub async fn save_invoice(
    invoice: &Invoice,
    template: Template,
    config: &StudioConfig,
) -> Result<SaveOutcome, InvoiceError> {
    with_action(config, "save", async {
        let total_start = Instant::now();

        // ── Step 1: Identity gate ────────────────────────────────────────
        let identity = resolve_identity(config);
        if !identity.is_signed_in() {
            identity.prompt_sign_in();
            return Err(InvoiceError::SignedOut);
        }

        // ── Step 2: Validate line items ──────────────────────────────────
        step_start(config, PipelineStep::Validate);
        template::validate_items(invoice)
            .map_err(|e| step_failed(config, PipelineStep::Validate, e))?;
        step_done(config, PipelineStep::Validate);

        // ── Step 3: Capture ──────────────────────────────────────────────
        step_start(config, PipelineStep::Capture);
        let bitmap = capture_invoice(invoice, template, config)
            .await
            .map_err(|e| step_failed(config, PipelineStep::Capture, e))?;
        step_done(config, PipelineStep::Capture);

        // ── Steps 4–6: uploads, payload, store ───────────────────────────
        let outcome = save_captured(&bitmap, invoice, template, config).await?;

        info!(
            elapsed_ms = total_start.elapsed().as_millis() as u64,
            number = %outcome.record.meta.number,
            "invoice saved"
        );
        Ok(outcome)
    })
    .await
}

/// The persistence bridge for an already-captured bitmap: upload the
/// thumbnail, upload (or re-upload) the logo, assemble the payload and
/// submit it to the store.
///
/// Exposed separately for hosts that hold their own capture; [`save_invoice`]
/// is this preceded by validation and capture.
pub async fn save_captured(
    bitmap: &RgbaImage,
    invoice: &Invoice,
    template: Template,
    config: &StudioConfig,
) -> Result<SaveOutcome, InvoiceError> {
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(InvoiceError::EmptyBitmap);
    }
    let storage = resolve_storage(config)?;
    let store = resolve_store(config)?;

    // ── Upload thumbnail ─────────────────────────────────────────────────
    step_start(config, PipelineStep::UploadThumbnail);
    let data_uri = upload::png_data_uri(bitmap)
        .map_err(|e| step_failed(config, PipelineStep::UploadThumbnail, e))?;
    let thumbnail_url = storage
        .upload(UploadSource::DataUri(data_uri), &config.thumbnail_preset)
        .await
        .map_err(|e| step_failed(config, PipelineStep::UploadThumbnail, e))?;
    step_done(config, PipelineStep::UploadThumbnail);

    // ── Upload logo ──────────────────────────────────────────────────────
    // Re-uploading an already-hosted logo passes its URL through; a local
    // path is read and sent as bytes; no logo skips the step entirely.
    step_start(config, PipelineStep::UploadLogo);
    let logo_url = upload_logo_source(&invoice.logo, &storage, config)
        .await
        .map_err(|e| step_failed(config, PipelineStep::UploadLogo, e))?;
    step_done(config, PipelineStep::UploadLogo);

    // ── Assemble payload ─────────────────────────────────────────────────
    // A clone: the caller's invoice stays untouched until the store
    // acknowledges.
    let mut record = invoice.clone();
    record.thumbnail_url = Some(thumbnail_url.clone());
    record.logo = logo_url.clone();
    record.template = Some(template);

    // ── Store save ───────────────────────────────────────────────────────
    step_start(config, PipelineStep::StoreSave);
    store
        .save(&record)
        .await
        .map_err(|e| step_failed(config, PipelineStep::StoreSave, e))?;
    step_done(config, PipelineStep::StoreSave);

    Ok(SaveOutcome {
        thumbnail_url,
        logo_url,
        record,
    })
}

async fn upload_logo_source(
    raw: &str,
    storage: &Arc<dyn ObjectStorage>,
    config: &StudioConfig,
) -> Result<String, InvoiceError> {
    match LogoSource::from_field(raw) {
        LogoSource::None => Ok(String::new()),
        LogoSource::Url(url) => {
            storage
                .upload(UploadSource::Url(url.to_string()), &config.logo_preset)
                .await
        }
        LogoSource::Path(path) => {
            let data = tokio::fs::read(path).await.map_err(|e| InvoiceError::Upload {
                preset: config.logo_preset.clone(),
                reason: format!("cannot read '{path}': {e}"),
            })?;
            let filename = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "logo".to_string());
            storage
                .upload(UploadSource::Bytes { data, filename }, &config.logo_preset)
                .await
        }
    }
}

/// Upload a logo asset on its own (the mid-editing "choose a logo" flow)
/// and return the durable URL.
pub async fn upload_logo(
    source: UploadSource,
    config: &StudioConfig,
) -> Result<String, InvoiceError> {
    let storage = resolve_storage(config)?;
    storage.upload(source, &config.logo_preset).await
}

// ── Download ─────────────────────────────────────────────────────────────

/// Capture the invoice and write it as a paginated PDF into the configured
/// output directory. Returns the written path
/// (`invoice_<epoch-millis>.pdf`).
pub async fn download_invoice(
    invoice: &Invoice,
    template: Template,
    config: &StudioConfig,
) -> Result<PathBuf, InvoiceError> {
    with_action(config, "download", async {
        step_start(config, PipelineStep::Validate);
        template::validate_items(invoice)
            .map_err(|e| step_failed(config, PipelineStep::Validate, e))?;
        step_done(config, PipelineStep::Validate);

        step_start(config, PipelineStep::Capture);
        let bitmap = capture_invoice(invoice, template, config)
            .await
            .map_err(|e| step_failed(config, PipelineStep::Capture, e))?;
        step_done(config, PipelineStep::Capture);

        step_start(config, PipelineStep::Export);
        let path = export::export_to_dir(&bitmap, &config.page, &config.output_dir)
            .map_err(|e| step_failed(config, PipelineStep::Export, e))?;
        step_done(config, PipelineStep::Export);

        Ok(path)
    })
    .await
}

// ── Delete ───────────────────────────────────────────────────────────────

/// Delete an invoice. With no assigned id this is a local-only discard:
/// the store is never contacted and the delete reports success. With an
/// id, the store must acknowledge the removal.
pub async fn delete_invoice(
    invoice: &Invoice,
    config: &StudioConfig,
) -> Result<(), InvoiceError> {
    with_action(config, "delete", async {
        let Some(id) = invoice.id.as_deref() else {
            info!("invoice has no id; discarded locally without a store call");
            return Ok(());
        };
        let store = resolve_store(config)?;
        step_start(config, PipelineStep::StoreDelete);
        store
            .delete(id)
            .await
            .map_err(|e| step_failed(config, PipelineStep::StoreDelete, e))?;
        step_done(config, PipelineStep::StoreDelete);
        Ok(())
    })
    .await
}

// ── Listing ──────────────────────────────────────────────────────────────

/// Fetch all stored invoices (the dashboard view).
pub async fn list_invoices(config: &StudioConfig) -> Result<Vec<Invoice>, InvoiceError> {
    let store = resolve_store(config)?;
    store.list().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EditingSession, ItemField};
    use async_trait::async_trait;
    use image::Rgba;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // ── In-memory doubles for the external services ──────────────────────

    #[derive(Default)]
    struct MemoryStorage {
        uploads: Mutex<Vec<String>>,
        counter: AtomicUsize,
        fail_preset: Option<String>,
    }

    impl MemoryStorage {
        fn failing_on(preset: &str) -> Self {
            Self {
                fail_preset: Some(preset.to_string()),
                ..Self::default()
            }
        }

        fn uploads(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn upload(&self, _source: UploadSource, preset: &str) -> Result<String, InvoiceError> {
            self.uploads.lock().unwrap().push(preset.to_string());
            if self.fail_preset.as_deref() == Some(preset) {
                return Err(InvoiceError::Upload {
                    preset: preset.to_string(),
                    reason: "HTTP 500".into(),
                });
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://cdn.test/{preset}/{n}.png"))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<Invoice>>,
        deleted: Mutex<Vec<String>>,
        reject_save: bool,
        reject_delete: bool,
    }

    impl MemoryStore {
        fn saved(&self) -> Vec<Invoice> {
            self.saved.lock().unwrap().clone()
        }

        fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InvoiceStore for MemoryStore {
        async fn list(&self) -> Result<Vec<Invoice>, InvoiceError> {
            Ok(self.saved())
        }

        async fn save(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
            if self.reject_save {
                return Err(InvoiceError::Save {
                    reason: "HTTP 500".into(),
                });
            }
            self.saved.lock().unwrap().push(invoice.clone());
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<(), InvoiceError> {
            if self.reject_delete {
                return Err(InvoiceError::Delete {
                    id: id.to_string(),
                    reason: "HTTP 500".into(),
                });
            }
            self.deleted.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    struct SignedOutIdentity;

    impl IdentityProvider for SignedOutIdentity {
        fn is_signed_in(&self) -> bool {
            false
        }

        fn prompt_sign_in(&self) {}
    }

    fn config_with(storage: Arc<MemoryStorage>, store: Arc<MemoryStore>) -> StudioConfig {
        StudioConfig::builder()
            .storage(storage)
            .store(store)
            .build()
            .unwrap()
    }

    fn bitmap() -> RgbaImage {
        RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]))
    }

    fn complete_invoice() -> Invoice {
        let mut s = EditingSession::new();
        s.set_item_field(0, ItemField::Qty, "2");
        s.set_item_field(0, ItemField::Amount, "50");
        s.into_invoice()
    }

    // ── Bridge semantics ─────────────────────────────────────────────────

    #[tokio::test]
    async fn save_uploads_then_stores_the_assembled_payload() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let mut invoice = complete_invoice();
        invoice.logo = "https://cdn.test/old-logo.png".to_string();

        let outcome = save_captured(&bitmap(), &invoice, Template::Modern, &config)
            .await
            .unwrap();

        // Thumbnail first, then the logo.
        assert_eq!(storage.uploads(), vec!["invoices-thumbnail", "company-logos"]);

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].thumbnail_url.as_deref(), Some(outcome.thumbnail_url.as_str()));
        assert_eq!(saved[0].logo, outcome.logo_url);
        assert_eq!(saved[0].template, Some(Template::Modern));
        assert!(outcome.thumbnail_url.contains("invoices-thumbnail"));
        assert!(outcome.logo_url.contains("company-logos"));

        // The caller's invoice is not mutated by the pipeline itself.
        assert!(invoice.thumbnail_url.is_none());
        assert_eq!(invoice.logo, "https://cdn.test/old-logo.png");
    }

    #[tokio::test]
    async fn logo_upload_failure_aborts_before_the_store() {
        let storage = Arc::new(MemoryStorage::failing_on("company-logos"));
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let mut invoice = complete_invoice();
        invoice.logo = "https://cdn.test/logo.png".to_string();

        let err = save_captured(&bitmap(), &invoice, Template::Classic, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Upload { ref preset, .. } if preset == "company-logos"));
        assert!(store.saved().is_empty(), "store never contacted");
    }

    #[tokio::test]
    async fn thumbnail_upload_failure_skips_the_logo_upload() {
        let storage = Arc::new(MemoryStorage::failing_on("invoices-thumbnail"));
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let err = save_captured(&bitmap(), &complete_invoice(), Template::Classic, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Upload { .. }));
        assert_eq!(storage.uploads(), vec!["invoices-thumbnail"]);
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn invoice_without_logo_skips_the_logo_upload() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let outcome = save_captured(&bitmap(), &complete_invoice(), Template::Bold, &config)
            .await
            .unwrap();
        assert_eq!(storage.uploads(), vec!["invoices-thumbnail"]);
        assert!(outcome.logo_url.is_empty());
        assert_eq!(store.saved()[0].logo, "");
    }

    #[tokio::test]
    async fn store_rejection_is_a_save_error_after_both_uploads() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Arc::new(MemoryStore {
            reject_save: true,
            ..MemoryStore::default()
        });
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let mut invoice = complete_invoice();
        invoice.logo = "https://cdn.test/logo.png".to_string();

        let err = save_captured(&bitmap(), &invoice, Template::Minimal, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Save { .. }));
        assert_eq!(storage.uploads().len(), 2, "failure came after both uploads");
    }

    #[tokio::test]
    async fn empty_bitmap_is_refused_before_any_upload() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let empty = RgbaImage::new(0, 0);
        let err = save_captured(&empty, &complete_invoice(), Template::Classic, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::EmptyBitmap));
        assert!(storage.uploads().is_empty());
    }

    // ── save_invoice gates ───────────────────────────────────────────────

    #[tokio::test]
    async fn signed_out_save_is_refused_before_any_work() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Arc::new(MemoryStore::default());
        let config = StudioConfig::builder()
            .storage(Arc::clone(&storage) as Arc<dyn ObjectStorage>)
            .store(Arc::clone(&store) as Arc<dyn InvoiceStore>)
            .identity(Arc::new(SignedOutIdentity))
            .build()
            .unwrap();

        let err = save_invoice(&complete_invoice(), Template::Classic, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::SignedOut));
        assert!(storage.uploads().is_empty());
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn incomplete_items_block_the_save_before_capture() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        // Fresh session: the single default item has blank qty/amount.
        let invoice = EditingSession::new().into_invoice();
        let err = save_invoice(&invoice, Template::Classic, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::IncompleteLineItem { .. }));
        assert!(storage.uploads().is_empty());
    }

    // ── Delete semantics ─────────────────────────────────────────────────

    #[tokio::test]
    async fn delete_without_id_is_a_local_discard() {
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::new(MemoryStorage::default()), Arc::clone(&store));

        delete_invoice(&complete_invoice(), &config).await.unwrap();
        assert!(store.deleted().is_empty(), "no network call");
    }

    #[tokio::test]
    async fn delete_with_id_requires_store_acknowledgement() {
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::new(MemoryStorage::default()), Arc::clone(&store));

        let mut invoice = complete_invoice();
        invoice.id = Some("inv-7".to_string());
        delete_invoice(&invoice, &config).await.unwrap();
        assert_eq!(store.deleted(), vec!["inv-7"]);

        let rejecting = Arc::new(MemoryStore {
            reject_delete: true,
            ..MemoryStore::default()
        });
        let config = config_with(Arc::new(MemoryStorage::default()), rejecting);
        let err = delete_invoice(&invoice, &config).await.unwrap_err();
        assert!(matches!(err, InvoiceError::Delete { .. }));
    }

    // ── Session adoption ─────────────────────────────────────────────────

    #[tokio::test]
    async fn session_adopts_urls_only_on_success() {
        let storage = Arc::new(MemoryStorage::failing_on("company-logos"));
        let store = Arc::new(MemoryStore::default());
        let config = config_with(Arc::clone(&storage), Arc::clone(&store));

        let mut session = EditingSession::new();
        session.set_item_field(0, ItemField::Qty, "1");
        session.set_item_field(0, ItemField::Amount, "10");
        session.select_template("classic");

        // Force the bridge path without rasterisation by failing uploads:
        // capture would need a font, so exercise the session through
        // save_captured semantics instead.
        let invoice = session.invoice().clone();
        let mut with_logo = invoice.clone();
        with_logo.logo = "https://cdn.test/logo.png".to_string();
        let err = save_captured(&bitmap(), &with_logo, Template::Classic, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Upload { .. }));
        // The session's invoice still has no thumbnail and its old logo.
        assert!(session.invoice().thumbnail_url.is_none());
    }

    // ── Progress events ──────────────────────────────────────────────────

    #[tokio::test]
    async fn progress_reports_the_failing_step_and_stops() {
        use crate::progress::{PipelineProgressCallback, PipelineStep};

        #[derive(Default)]
        struct Recorder {
            events: Mutex<Vec<String>>,
        }

        impl PipelineProgressCallback for Recorder {
            fn on_step_start(&self, step: PipelineStep) {
                self.events.lock().unwrap().push(format!("start:{step:?}"));
            }

            fn on_step_error(&self, step: PipelineStep, _error: &str) {
                self.events.lock().unwrap().push(format!("error:{step:?}"));
            }
        }

        let recorder = Arc::new(Recorder::default());
        let storage = Arc::new(MemoryStorage::failing_on("company-logos"));
        let store = Arc::new(MemoryStore::default());
        let config = StudioConfig::builder()
            .storage(storage)
            .store(store)
            .progress_callback(Arc::clone(&recorder) as crate::progress::PipelineProgress)
            .build()
            .unwrap();

        let mut invoice = complete_invoice();
        invoice.logo = "https://cdn.test/logo.png".to_string();
        let _ = save_captured(&bitmap(), &invoice, Template::Classic, &config).await;

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "start:UploadThumbnail",
                "start:UploadLogo",
                "error:UploadLogo"
            ]
        );
    }
}
