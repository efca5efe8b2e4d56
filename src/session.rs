//! The editing session: exclusive owner of one invoice being edited.
//!
//! ## Why funnel every edit through named operations?
//!
//! The invoice is mutated from many places in a host UI (company form,
//! item rows, tax field, template picker). Routing every mutation through
//! one owner with one method per field group keeps the core invariants in a
//! single place: a line's derived total is recomputed the moment its qty or
//! amount changes (and only that line's), the item list never drops below
//! one entry, and the invoice number is generated exactly once and never
//! overwritten by later edits.
//!
//! The session's async actions (`save`, `download`, `delete`,
//! `upload_logo`) take `&mut self`, so a second action cannot start while
//! one is outstanding — the borrow checker plays the role of the disabled
//! button. Local state is updated only after an action fully succeeds;
//! every failure leaves the invoice exactly as it was for retry.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::StudioConfig;
use crate::error::InvoiceError;
use crate::model::{generate_invoice_number, Invoice, Party};
use crate::pipeline::upload::UploadSource;
use crate::save;
use crate::template::{self, Template};
use crate::totals::{self, Totals};

/// Which party block a field edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyKind {
    Company,
    Billing,
    Shipping,
}

/// Editable fields of a [`Party`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyField {
    Name,
    Phone,
    Address,
}

/// Editable fields of the bank account block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Name,
    Number,
    Swift,
}

/// Editable fields of a line item. `Total` is deliberately absent: it is
/// derived and cannot be edited independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Qty,
    Amount,
    Description,
}

/// Exclusively-owned editing state for one invoice.
#[derive(Debug, Clone)]
pub struct EditingSession {
    invoice: Invoice,
}

impl EditingSession {
    /// Start a session on a fresh invoice: defaults plus a generated
    /// invoice number.
    pub fn new() -> Self {
        let mut session = Self {
            invoice: Invoice::new(),
        };
        session.ensure_number();
        session
    }

    /// Start a session on a record fetched from the store. The fetched
    /// fields replace the fresh defaults; a number is generated only when
    /// the record has none.
    pub fn from_record(record: Invoice) -> Self {
        let mut session = Self { invoice: record };
        session.ensure_number();
        session
    }

    /// Assign a generated number when (and only when) none is present.
    /// A non-empty number is never overwritten.
    fn ensure_number(&mut self) {
        if self.invoice.meta.number.is_empty() {
            self.invoice.meta.number = generate_invoice_number();
            debug!(number = %self.invoice.meta.number, "generated invoice number");
        }
    }

    /// The current invoice state.
    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    /// Consume the session, yielding the invoice.
    pub fn into_invoice(self) -> Invoice {
        self.invoice
    }

    /// Totals derived from the current items and tax rate. Computed on
    /// demand — there is no cached copy to go stale.
    pub fn totals(&self) -> Totals {
        totals::compute_totals(&self.invoice.items, &self.invoice.tax)
    }

    // ── Field-group updates ──────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.invoice.title = title.into();
    }

    pub fn set_party_field(&mut self, kind: PartyKind, field: PartyField, value: impl Into<String>) {
        let party = match kind {
            PartyKind::Company => &mut self.invoice.company,
            PartyKind::Billing => &mut self.invoice.billing,
            PartyKind::Shipping => &mut self.invoice.shipping,
        };
        let value = value.into();
        match field {
            PartyField::Name => party.name = value,
            PartyField::Phone => party.phone = value,
            PartyField::Address => party.address = value,
        }
    }

    /// "Same as billing": copy the billing block over the shipping block.
    pub fn copy_billing_to_shipping(&mut self) {
        self.invoice.shipping = Party {
            name: self.invoice.billing.name.clone(),
            phone: self.invoice.billing.phone.clone(),
            address: self.invoice.billing.address.clone(),
        };
    }

    pub fn set_invoice_date(&mut self, date: Option<chrono::NaiveDate>) {
        self.invoice.meta.date = date;
    }

    pub fn set_due_date(&mut self, date: Option<chrono::NaiveDate>) {
        self.invoice.meta.due_date = date;
    }

    pub fn set_account_field(&mut self, field: AccountField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AccountField::Name => self.invoice.account.name = value,
            AccountField::Number => self.invoice.account.number = value,
            AccountField::Swift => self.invoice.account.swift = value,
        }
    }

    pub fn set_tax_rate(&mut self, raw: impl Into<String>) {
        self.invoice.tax = raw.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.invoice.notes = notes.into();
    }

    // ── Line items ───────────────────────────────────────────────────────

    /// Append a blank line item.
    pub fn add_item(&mut self) {
        self.invoice.items.push(Default::default());
    }

    /// Remove the item at `index`. Removing the last remaining item (or an
    /// out-of-range index) is a no-op; the list never becomes empty.
    /// Returns whether an item was removed.
    pub fn remove_item(&mut self, index: usize) -> bool {
        if self.invoice.items.len() <= 1 || index >= self.invoice.items.len() {
            return false;
        }
        self.invoice.items.remove(index);
        true
    }

    /// Edit one field of one item. A qty/amount edit recomputes that
    /// item's derived total synchronously; other items are untouched.
    /// Out-of-range indexes are ignored.
    pub fn set_item_field(&mut self, index: usize, field: ItemField, value: impl Into<String>) {
        let Some(item) = self.invoice.items.get_mut(index) else {
            return;
        };
        let value = value.into();
        match field {
            ItemField::Name => item.name = value,
            ItemField::Description => item.description = value,
            ItemField::Qty => {
                item.qty = value;
                item.total = totals::line_total(item);
            }
            ItemField::Amount => {
                item.amount = value;
                item.total = totals::line_total(item);
            }
        }
    }

    // ── Template selection ───────────────────────────────────────────────

    /// Attempt to select a template by id. Unknown ids are a no-op that
    /// keeps the current selection.
    pub fn select_template(&mut self, id: &str) {
        self.invoice.template = template::select(self.invoice.template, id);
    }

    pub fn template(&self) -> Option<Template> {
        self.invoice.template
    }

    /// Validate the edit-to-preview transition for the current items.
    pub fn validate_for_preview(&self) -> Result<(), InvoiceError> {
        template::validate_items(&self.invoice)
    }

    // ── Actions (suspend the session while in flight) ────────────────────

    /// Upload a logo asset and record its durable URL on success.
    pub async fn upload_logo(
        &mut self,
        source: UploadSource,
        config: &StudioConfig,
    ) -> Result<String, InvoiceError> {
        let url = save::upload_logo(source, config).await?;
        self.invoice.logo = url.clone();
        info!(url = %url, "logo uploaded");
        Ok(url)
    }

    /// Run the full save pipeline for the current invoice and selected
    /// template. On success the session adopts the durable thumbnail and
    /// logo URLs; on any failure the invoice is left untouched.
    pub async fn save(&mut self, config: &StudioConfig) -> Result<(), InvoiceError> {
        let template = self.invoice.template.ok_or(InvoiceError::NoTemplate)?;
        let outcome = save::save_invoice(&self.invoice, template, config).await?;
        self.invoice.thumbnail_url = Some(outcome.thumbnail_url);
        self.invoice.logo = outcome.logo_url;
        Ok(())
    }

    /// Capture the invoice and export it as a paginated PDF in the
    /// configured output directory. Returns the written path.
    pub async fn download(&mut self, config: &StudioConfig) -> Result<PathBuf, InvoiceError> {
        let template = self.invoice.template.ok_or(InvoiceError::NoTemplate)?;
        save::download_invoice(&self.invoice, template, config).await
    }

    /// Delete this invoice. Without an id this is a local-only discard —
    /// no network call is made and the delete reports success.
    pub async fn delete(&mut self, config: &StudioConfig) -> Result<(), InvoiceError> {
        save::delete_invoice(&self.invoice, config).await
    }
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new()
    }
}
