//! # invoicegen
//!
//! Assemble structured invoice data, compute derived totals, render the
//! invoice against a visual template, and export the rendered result as a
//! persisted thumbnail and a paginated PDF.
//!
//! ## Why this crate?
//!
//! Invoice tools tend to bolt exporting onto a UI as an afterthought — a
//! screenshot of whatever happens to be on screen, at screen resolution,
//! over whatever background the theme uses. This crate treats the
//! capture/convert/persist path as the product: totals are a pure function
//! of the line items, captures are oversampled and background-forced, page
//! splitting reconstructs the bitmap exactly, and the save pipeline either
//! completes every step or leaves your data untouched.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Invoice
//!  │
//!  ├─ 1. Session  named update ops; totals recomputed on every edit
//!  ├─ 2. Template validate items, pick a layout variant
//!  ├─ 3. Layout   absolutely-positioned view (text, fills, logo)
//!  ├─ 4. Capture  rasterise at 2× on opaque white (spawn_blocking)
//!  ├─ 5. Export   slice into A4 pages → invoice_<millis>.pdf
//!  └─ 6. Persist  upload thumbnail + logo → save record to the store
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoicegen::{EditingSession, ItemField, StudioConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StudioConfig::builder()
//!         .cloud_name("demo")
//!         .store_base_url("http://localhost:8080/api")
//!         .build()?;
//!
//!     let mut session = EditingSession::new();
//!     session.set_item_field(0, ItemField::Name, "Design work");
//!     session.set_item_field(0, ItemField::Qty, "2");
//!     session.set_item_field(0, ItemField::Amount, "50");
//!     session.set_tax_rate("10");
//!     session.select_template("modern");
//!
//!     let totals = session.totals();
//!     println!("grand total: {}", invoicegen::format_amount(totals.grand_total));
//!
//!     let pdf = session.download(&config).await?;
//!     println!("wrote {}", pdf.display());
//!     session.save(&config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `invoicegen` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! invoicegen = { version = "0.3", default-features = false }
//! ```
//!
//! ## External services
//!
//! Persistence talks to two HTTP services through trait seams — an
//! object-storage endpoint ([`ObjectStorage`]) for thumbnails and logos,
//! and an invoice-store ([`InvoiceStore`]) for the records — plus an
//! [`IdentityProvider`] that gates saving. Inject your own implementations
//! through [`StudioConfig`] for testing or other backends.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod font;
pub mod identity;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod save;
pub mod session;
pub mod template;
pub mod totals;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{StudioConfig, StudioConfigBuilder};
pub use error::InvoiceError;
pub use font::Typeface;
pub use identity::{EnvTokenIdentity, HostManagedIdentity, IdentityProvider};
pub use layout::{layout_invoice, InvoiceView, LayoutOptions};
pub use model::{generate_invoice_number, BankAccount, Invoice, InvoiceMeta, LineItem, Party};
pub use pipeline::capture::{capture, CaptureOptions};
pub use pipeline::export::{export_filename, paginate, PageSetup, PageSlice};
pub use pipeline::store::{InvoiceStore, RestInvoiceStore};
pub use pipeline::upload::{
    CloudinaryStorage, ObjectStorage, UploadSource, LOGO_PRESET, THUMBNAIL_PRESET,
};
pub use progress::{NoopProgressCallback, PipelineProgress, PipelineProgressCallback, PipelineStep};
pub use save::{
    capture_invoice, delete_invoice, download_invoice, list_invoices, save_captured, save_invoice,
    upload_logo, SaveOutcome,
};
pub use session::{AccountField, EditingSession, ItemField, PartyField, PartyKind};
pub use template::Template;
pub use totals::{coerce_amount, compute_totals, format_amount, Totals};
