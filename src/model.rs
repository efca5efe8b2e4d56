//! The Invoice Model: canonical in-memory representation of one invoice.
//!
//! The serde shape doubles as the invoice-store wire format, so field names
//! follow the stored record (`qty`, `amount`, `dueDate`, `SWIFT`,
//! `thumbnailUrl`). Quantity, amount and tax rate are kept as the raw text
//! the user typed — they may be blank or non-numeric mid-edit, and coercion
//! to numbers happens in one place only ([`crate::totals::coerce_amount`]).
//!
//! The only behaviour here is shape and defaults; derived totals live in
//! [`crate::totals`] and all mutation goes through
//! [`crate::session::EditingSession`].

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A name/phone/address triple used for the company, billing and shipping
/// sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Invoice number and calendar dates.
///
/// `number` is generated once when blank (see
/// [`generate_invoice_number`]) and is never overwritten by later edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMeta {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
}

/// Bank account details shown in the footer of the rendered invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default, rename = "SWIFT")]
    pub swift: String,
}

/// One invoice line.
///
/// `qty` and `amount` hold raw user input. `total` is derived — it is
/// recomputed whenever `qty` or `amount` changes on this item, and is never
/// edited independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total: Decimal,
}

/// The root invoice record.
///
/// `items` is ordered (display order = entry order) and holds at least one
/// element from initialisation onwards. `thumbnail_url` is populated only
/// after a successful save; `logo` stays empty until a logo upload succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub company: Party,
    #[serde(default)]
    pub billing: Party,
    #[serde(default)]
    pub shipping: Party,
    #[serde(default, rename = "invoice")]
    pub meta: InvoiceMeta,
    #[serde(default)]
    pub account: BankAccount,
    #[serde(default = "default_items")]
    pub items: Vec<LineItem>,
    /// Tax rate in percent, as typed. Coerced on read; negative and
    /// non-numeric values count as zero.
    #[serde(default = "default_tax")]
    pub tax: String,
    #[serde(default)]
    pub notes: String,
    /// URL of the hosted company logo; empty until an upload succeeds.
    #[serde(default)]
    pub logo: String,
    /// Selected template id. Unknown ids on the wire decode to `None`
    /// rather than failing the whole record.
    #[serde(default, deserialize_with = "crate::template::deserialize_lenient")]
    pub template: Option<crate::template::Template>,
    #[serde(default, rename = "thumbnailUrl", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

fn default_title() -> String {
    "New Invoice".to_string()
}

fn default_tax() -> String {
    "0".to_string()
}

fn default_items() -> Vec<LineItem> {
    vec![LineItem::default()]
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            id: None,
            title: default_title(),
            company: Party::default(),
            billing: Party::default(),
            shipping: Party::default(),
            meta: InvoiceMeta::default(),
            account: BankAccount::default(),
            items: default_items(),
            tax: default_tax(),
            notes: String::new(),
            logo: String::new(),
            template: None,
            thumbnail_url: None,
        }
    }
}

impl Invoice {
    /// A fresh invoice with defaults and no generated number yet.
    ///
    /// Number generation is an explicit session step so that a record
    /// fetched from the store is never re-numbered.
    pub fn new() -> Self {
        Self::default()
    }
}

static INVOICE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^INV-\d{6}$").expect("invoice number pattern"));

/// Generate a display invoice number: `INV-` plus a 6-digit pseudo-random
/// integer in [100000, 999999].
pub fn generate_invoice_number() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("INV-{n}")
}

/// Whether `number` has the generated `INV-\d{6}` shape.
pub fn is_generated_number(number: &str) -> bool {
    INVOICE_NUMBER_RE.is_match(number)
}
