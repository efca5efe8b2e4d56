//! The Totals Engine: pure derivation of per-line and invoice-level totals.
//!
//! ## Why one coercion function?
//!
//! Quantity, amount and tax rate all arrive as raw text that may be blank or
//! non-numeric while the user is still typing. Rather than re-deriving a
//! zero-fallback at every call site, [`coerce_amount`] is the single, total
//! (never-failing) mapping from raw text to a number; blank and invalid
//! input are canonically zero. Nothing in the engine can raise an error at
//! the user mid-keystroke.
//!
//! All values are [`Decimal`], so internal results keep full precision;
//! [`format_amount`] rounds to two decimal places for presentation only.
//! Recomputation is synchronous and allocation-free — totals are always a
//! pure function of the current items and tax rate, never a cached value
//! that can go stale against the displayed list.

use crate::model::LineItem;
use rust_decimal::Decimal;

/// Coerce raw user text to a number. Blank or unparseable input maps to
/// zero; whitespace is ignored.
pub fn coerce_amount(raw: &str) -> Decimal {
    raw.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// The derived total for one line: `qty × amount` after coercion.
pub fn line_total(item: &LineItem) -> Decimal {
    coerce_amount(&item.qty) * coerce_amount(&item.amount)
}

/// Invoice-level derived totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
}

/// Compute subtotal, tax amount and grand total from the current items and
/// raw tax-rate text.
///
/// The subtotal is recomputed from each line's qty/amount rather than read
/// from the stored `total` field, so a stale stored value can never leak
/// into the invoice totals. A negative or non-numeric tax rate counts as
/// zero — tax never goes negative.
pub fn compute_totals(items: &[LineItem], tax: &str) -> Totals {
    let subtotal: Decimal = items.iter().map(line_total).sum();
    let rate = coerce_amount(tax);
    let tax_amount = if rate > Decimal::ZERO {
        subtotal * rate / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    Totals {
        subtotal,
        tax_amount,
        grand_total: subtotal + tax_amount,
    }
}

/// Format a monetary value with exactly two decimal places, for display.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(qty: &str, amount: &str) -> LineItem {
        LineItem {
            qty: qty.into(),
            amount: amount.into(),
            ..LineItem::default()
        }
    }

    #[test]
    fn coerce_parses_plain_numbers() {
        assert_eq!(coerce_amount("2"), dec("2"));
        assert_eq!(coerce_amount(" 50.25 "), dec("50.25"));
        assert_eq!(coerce_amount("-3"), dec("-3"));
    }

    #[test]
    fn coerce_maps_blank_and_garbage_to_zero() {
        assert_eq!(coerce_amount(""), Decimal::ZERO);
        assert_eq!(coerce_amount("   "), Decimal::ZERO);
        assert_eq!(coerce_amount("abc"), Decimal::ZERO);
        assert_eq!(coerce_amount("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn line_total_is_qty_times_amount() {
        assert_eq!(line_total(&item("2", "50")), dec("100"));
        assert_eq!(line_total(&item("1.5", "10")), dec("15"));
    }

    #[test]
    fn line_total_with_blank_input_is_zero() {
        assert_eq!(line_total(&item("", "")), Decimal::ZERO);
        assert_eq!(line_total(&item("2", "")), Decimal::ZERO);
        assert_eq!(line_total(&item("", "30")), Decimal::ZERO);
    }

    #[test]
    fn documented_scenario_two_items_ten_percent() {
        let items = vec![item("2", "50"), item("1", "30")];
        let t = compute_totals(&items, "10");
        assert_eq!(format_amount(t.subtotal), "130.00");
        assert_eq!(format_amount(t.tax_amount), "13.00");
        assert_eq!(format_amount(t.grand_total), "143.00");
    }

    #[test]
    fn documented_scenario_blank_item_zero_tax() {
        let items = vec![item("", "")];
        let t = compute_totals(&items, "0");
        assert_eq!(format_amount(t.subtotal), "0.00");
        assert_eq!(format_amount(t.tax_amount), "0.00");
        assert_eq!(format_amount(t.grand_total), "0.00");
    }

    #[test]
    fn negative_or_invalid_tax_rate_counts_as_zero() {
        let items = vec![item("4", "25")];
        assert_eq!(compute_totals(&items, "-5").tax_amount, Decimal::ZERO);
        assert_eq!(compute_totals(&items, "n/a").tax_amount, Decimal::ZERO);
        assert_eq!(compute_totals(&items, "").tax_amount, Decimal::ZERO);
        assert_eq!(compute_totals(&items, "-5").grand_total, dec("100"));
    }

    #[test]
    fn subtotal_ignores_stale_stored_totals() {
        let mut stale = item("2", "50");
        stale.total = dec("9999");
        let t = compute_totals(&[stale], "0");
        assert_eq!(t.subtotal, dec("100"));
    }

    #[test]
    fn fractional_precision_is_kept_internally() {
        let items = vec![item("3", "0.1")];
        let t = compute_totals(&items, "0");
        assert_eq!(t.subtotal, dec("0.3"));
        assert_eq!(format_amount(t.subtotal), "0.30");
    }
}
