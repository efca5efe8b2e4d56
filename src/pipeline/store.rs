//! The invoice-store seam and its REST client.
//!
//! The store owns persistence; this crate only consumes it. Success is an
//! explicit status, never an assumption: a save counts only on HTTP 200
//! and a delete only on HTTP 204 — anything else (including transport
//! failure) surfaces as the corresponding error and leaves local state
//! untouched for retry.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::InvoiceError;
use crate::model::Invoice;

/// The external invoice-store service.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// All stored invoices, newest-first or however the store orders them.
    async fn list(&self) -> Result<Vec<Invoice>, InvoiceError>;

    /// Persist `invoice`. Returns only when the store acknowledged with
    /// its success status.
    async fn save(&self, invoice: &Invoice) -> Result<(), InvoiceError>;

    /// Remove the invoice with `id`. Returns only on an acknowledged
    /// delete.
    async fn delete(&self, id: &str) -> Result<(), InvoiceError>;
}

/// REST implementation against `{base_url}/invoices`.
pub struct RestInvoiceStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestInvoiceStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            // No request timeout by design; see the crate docs on hangs.
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn invoices_url(&self) -> String {
        format!("{}/invoices", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl InvoiceStore for RestInvoiceStore {
    async fn list(&self) -> Result<Vec<Invoice>, InvoiceError> {
        debug!(url = %self.invoices_url(), "listing invoices");
        let response = self
            .client
            .get(self.invoices_url())
            .send()
            .await
            .map_err(|e| InvoiceError::StoreList {
                reason: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(InvoiceError::StoreList {
                reason: format!("HTTP {}", response.status()),
            });
        }
        response.json().await.map_err(|e| InvoiceError::StoreList {
            reason: format!("malformed response: {e}"),
        })
    }

    async fn save(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
        info!(url = %self.invoices_url(), number = %invoice.meta.number, "saving invoice");
        let response = self
            .client
            .post(self.invoices_url())
            .json(invoice)
            .send()
            .await
            .map_err(|e| InvoiceError::Save {
                reason: e.to_string(),
            })?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(InvoiceError::Save {
                reason: format!("HTTP {status}"),
            }),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), InvoiceError> {
        let url = format!("{}/{id}", self.invoices_url());
        info!(%url, "deleting invoice");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| InvoiceError::Delete {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(InvoiceError::Delete {
                id: id.to_string(),
                reason: format!("HTTP {status}"),
            }),
        }
    }
}
