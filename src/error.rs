//! Error types for the invoicegen library.
//!
//! One enum, [`InvoiceError`], covers every failure the pipeline can surface.
//! The variants double as the "which step failed" tag of the save pipeline:
//! a caller that receives `Upload { .. }` knows the store was never
//! contacted, and a caller that receives `Save { .. }` knows both asset
//! uploads already succeeded.
//!
//! None of these failures are fatal to an editing session. The invoice data
//! is never discarded on error; every operation leaves the model exactly as
//! it was before the attempt, so the user can correct input or simply retry.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the invoicegen library.
#[derive(Debug, Error)]
pub enum InvoiceError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// A line item is missing its quantity or amount. Blocks the
    /// edit-to-preview transition until the user fills both in.
    #[error("Line item {index} ('{name}') has a blank quantity or amount.\nEnter both before choosing a template.")]
    IncompleteLineItem { index: usize, name: String },

    /// Preview/export was requested with no template selected.
    #[error("No template selected.\nPick one of: classic, modern, minimal, bold.")]
    NoTemplate,

    // ── Capture errors ────────────────────────────────────────────────────
    /// The laid-out view has no content or zero-sized bounds; there is
    /// nothing to rasterise and no partial bitmap is produced.
    #[error("Nothing to capture: the invoice view is empty or zero-sized")]
    EmptyView,

    /// No usable typeface could be loaded for rasterisation.
    #[error("No usable typeface: {detail}\nSet StudioConfig::font_path or install a TrueType font (DejaVu, Liberation).")]
    FontUnavailable { detail: String },

    /// The logo could not be fetched from its URL or read from disk.
    #[error("Failed to fetch logo from '{src}': {reason}")]
    LogoFetch { src: String, reason: String },

    /// The logo bytes were fetched but are not a decodable image.
    #[error("Failed to decode logo image: {detail}")]
    LogoDecode { detail: String },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// An asset upload failed. The save aborts here: the invoice-store is
    /// never contacted and the local invoice is left untouched.
    #[error("Upload with preset '{preset}' failed: {reason}\nThe invoice was not saved.")]
    Upload { preset: String, reason: String },

    // ── Store errors ──────────────────────────────────────────────────────
    /// The invoice-store rejected the save or could not be reached. Both
    /// asset uploads succeeded, but nothing was persisted; the invoice
    /// remains editable for retry.
    #[error("Invoice-store save failed: {reason}\nThe invoice remains editable; retry when the store is reachable.")]
    Save { reason: String },

    /// The invoice-store did not acknowledge removal of a persisted invoice.
    #[error("Invoice-store refused to delete invoice '{id}': {reason}")]
    Delete { id: String, reason: String },

    /// Listing stored invoices failed.
    #[error("Failed to list invoices from the store: {reason}")]
    StoreList { reason: String },

    /// The caller is signed out; saving requires an authenticated session.
    #[error("You are signed out.\nSign in and retry the save.")]
    SignedOut,

    // ── Export errors ─────────────────────────────────────────────────────
    /// There is no captured bitmap (or it is zero-sized) to paginate.
    #[error("Nothing to export: the captured bitmap is missing or zero-sized")]
    EmptyBitmap,

    /// The PDF writer failed while assembling pages.
    #[error("Failed to assemble the PDF document: {detail}")]
    PdfWrite { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed, or a service was used without the
    /// settings needed to construct it.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvoiceError {
    /// Short machine-readable name of the pipeline step this error belongs
    /// to. Useful for logging and for UIs that map failures to controls.
    pub fn step(&self) -> &'static str {
        match self {
            InvoiceError::IncompleteLineItem { .. } | InvoiceError::NoTemplate => "validate",
            InvoiceError::EmptyView
            | InvoiceError::FontUnavailable { .. }
            | InvoiceError::LogoFetch { .. }
            | InvoiceError::LogoDecode { .. } => "capture",
            InvoiceError::Upload { .. } => "upload",
            InvoiceError::Save { .. } | InvoiceError::SignedOut => "save",
            InvoiceError::Delete { .. } => "delete",
            InvoiceError::StoreList { .. } => "list",
            InvoiceError::EmptyBitmap
            | InvoiceError::PdfWrite { .. }
            | InvoiceError::OutputWrite { .. } => "export",
            InvoiceError::InvalidConfig(_) | InvoiceError::Internal(_) => "config",
        }
    }
}
