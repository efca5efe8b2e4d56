//! The Template Selector: a fixed set of visual templates and the
//! validation gate in front of the preview transition.
//!
//! Selection is deliberately forgiving: an id outside the known set is a
//! no-op that keeps the current selection, so a stale link or a corrupted
//! stored record can never crash the render. The preview transition itself
//! is strict the other way — it is refused until every line item has both a
//! quantity and an amount.

use crate::error::InvoiceError;
use crate::model::Invoice;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a renderable layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Classic,
    Modern,
    Minimal,
    Bold,
}

impl Template {
    /// Every known template, in display order.
    pub const ALL: [Template; 4] = [
        Template::Classic,
        Template::Modern,
        Template::Minimal,
        Template::Bold,
    ];

    /// The wire/CLI id of this template.
    pub fn id(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Minimal => "minimal",
            Template::Bold => "bold",
        }
    }

    /// Human-readable label for pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Modern => "Modern",
            Template::Minimal => "Minimal",
            Template::Bold => "Bold",
        }
    }

    /// Parse an id against the known set. Unknown ids yield `None`; the
    /// match is case-insensitive and whitespace-tolerant.
    pub fn parse(id: &str) -> Option<Template> {
        match id.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Template::Classic),
            "modern" => Some(Template::Modern),
            "minimal" => Some(Template::Minimal),
            "bold" => Some(Template::Bold),
            _ => None,
        }
    }
}

/// Apply a selection attempt: a known id replaces the current selection,
/// anything else leaves it unchanged.
pub fn select(current: Option<Template>, id: &str) -> Option<Template> {
    Template::parse(id).or(current)
}

/// Lenient serde decoder for the `template` field of a stored record:
/// missing, null or unknown ids all decode to `None` instead of failing
/// the whole record.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Template>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Template::parse))
}

/// Gate for the edit-to-preview transition: every line item must have a
/// non-blank quantity and a non-blank amount.
///
/// Returns the first offending item so the message can point at it.
pub fn validate_items(invoice: &Invoice) -> Result<(), InvoiceError> {
    for (index, item) in invoice.items.iter().enumerate() {
        if item.qty.trim().is_empty() || item.amount.trim().is_empty() {
            return Err(InvoiceError::IncompleteLineItem {
                index: index + 1,
                name: item.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn invoice_with(items: Vec<LineItem>) -> Invoice {
        Invoice {
            items,
            ..Invoice::new()
        }
    }

    fn item(qty: &str, amount: &str) -> LineItem {
        LineItem {
            qty: qty.into(),
            amount: amount.into(),
            ..LineItem::default()
        }
    }

    #[test]
    fn parse_accepts_known_ids() {
        assert_eq!(Template::parse("classic"), Some(Template::Classic));
        assert_eq!(Template::parse(" Modern "), Some(Template::Modern));
        assert_eq!(Template::parse("BOLD"), Some(Template::Bold));
    }

    #[test]
    fn parse_rejects_unknown_ids() {
        assert_eq!(Template::parse(""), None);
        assert_eq!(Template::parse("neon"), None);
        assert_eq!(Template::parse("classic2"), None);
    }

    #[test]
    fn select_with_unknown_id_keeps_current() {
        let current = Some(Template::Minimal);
        assert_eq!(select(current, "does-not-exist"), current);
        assert_eq!(select(None, "does-not-exist"), None);
    }

    #[test]
    fn select_with_known_id_switches() {
        assert_eq!(select(Some(Template::Classic), "bold"), Some(Template::Bold));
        assert_eq!(select(None, "modern"), Some(Template::Modern));
    }

    #[test]
    fn ids_round_trip_through_parse() {
        for t in Template::ALL {
            assert_eq!(Template::parse(t.id()), Some(t));
        }
    }

    #[test]
    fn transition_refused_with_blank_qty_or_amount() {
        let inv = invoice_with(vec![item("2", "50"), item("", "30")]);
        match validate_items(&inv) {
            Err(InvoiceError::IncompleteLineItem { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected IncompleteLineItem, got {other:?}"),
        }

        let inv = invoice_with(vec![item("2", "  ")]);
        assert!(validate_items(&inv).is_err());
    }

    #[test]
    fn transition_accepted_when_all_items_complete() {
        let inv = invoice_with(vec![item("2", "50"), item("1", "30")]);
        assert!(validate_items(&inv).is_ok());
    }
}
